use std::{future::Future, sync::Arc};

use time::OffsetDateTime;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::state::{GamedaySnapshot, Mutation};

const MUTATION_QUEUE_CAPACITY: usize = 64;

/// Narrow handle producers use to deliver facts to the session's single writer.
///
/// Holds no reference to the coordinator; once the session token is
/// cancelled every submission is refused.
#[derive(Clone)]
pub struct MutationSink {
    tx: mpsc::Sender<Mutation>,
    cancel: CancellationToken,
}

impl MutationSink {
    /// Queue a mutation. Returns `false` once the session has been torn down,
    /// which producers treat as their signal to stop.
    pub async fn submit(&self, mutation: Mutation) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(mutation) => sent.is_ok(),
        }
    }

    /// Await `work` unless the session is torn down first.
    pub async fn until_cancelled<F>(&self, work: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = work => Some(output),
        }
    }

    /// Session cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Tear the session down: producers stop and the funnel applies nothing more.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the session has been torn down.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Start the single writer for one session.
pub fn spawn(
    snapshot: Arc<watch::Sender<GamedaySnapshot>>,
    cancel: CancellationToken,
) -> (MutationSink, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(MUTATION_QUEUE_CAPACITY);
    let handle = tokio::spawn(run(snapshot, rx, cancel.clone()));
    (MutationSink { tx, cancel }, handle)
}

async fn run(
    snapshot: Arc<watch::Sender<GamedaySnapshot>>,
    mut rx: mpsc::Receiver<Mutation>,
    cancel: CancellationToken,
) {
    loop {
        let mutation = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(mutation) => mutation,
                None => break,
            },
        };

        if cancel.is_cancelled() {
            break;
        }

        let now = OffsetDateTime::now_utc();
        snapshot.send_modify(|state| state.apply(mutation, now));
    }

    debug!("mutation funnel stopped");
}
