use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{sync::watch, time::sleep};
use tracing::{debug, warn};

use crate::{
    dao::repository::{EventRepository, LeaderboardRepository},
    services::funnel::MutationSink,
    state::Mutation,
};

/// Whether the poll loop of the current session is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// No session is polling.
    #[default]
    Stopped,
    /// Sleeping or refreshing.
    Running,
}

/// Unconditional freshness backstop: re-fetches the full event and the
/// leaderboard on a fixed cadence for as long as the screen is visible.
pub struct FallbackPoller {
    event_id: String,
    interval: Duration,
    events: Arc<dyn EventRepository>,
    leaderboards: Arc<dyn LeaderboardRepository>,
    state: Arc<watch::Sender<PollerState>>,
}

impl FallbackPoller {
    /// Poller for `event_id` refreshing every `interval`.
    pub fn new(
        event_id: String,
        interval: Duration,
        events: Arc<dyn EventRepository>,
        leaderboards: Arc<dyn LeaderboardRepository>,
        state: Arc<watch::Sender<PollerState>>,
    ) -> Self {
        Self {
            event_id,
            interval,
            events,
            leaderboards,
            state,
        }
    }

    /// Poll until the session is torn down.
    pub async fn run(self, sink: MutationSink) {
        self.state.send_replace(PollerState::Running);

        loop {
            if sink.is_closed() {
                break;
            }
            if sink.until_cancelled(sleep(self.interval)).await.is_none() {
                break;
            }
            if sink.is_closed() {
                break;
            }
            if !self.poll_once(&sink).await {
                break;
            }
        }

        self.state.send_replace(PollerState::Stopped);
        debug!(event_id = %self.event_id, "fallback poller stopped");
    }

    /// One refresh; returns `false` when the session went away meanwhile.
    async fn poll_once(&self, sink: &MutationSink) -> bool {
        match sink
            .until_cancelled(self.events.fetch_event(&self.event_id))
            .await
        {
            None => return false,
            Some(Ok(event)) => {
                if !sink.submit(Mutation::EventRefreshed(event)).await {
                    return false;
                }
            }
            Some(Err(err)) => {
                warn!(event_id = %self.event_id, error = %err, "poll refresh failed; keeping last snapshot");
            }
        }

        refresh_leaderboard(self.leaderboards.as_ref(), &self.event_id, sink).await
    }
}

/// Fetch the leaderboard and replace the snapshot's copy; failures keep the stale one.
///
/// Returns `false` when the session went away meanwhile.
pub async fn refresh_leaderboard(
    leaderboards: &dyn LeaderboardRepository,
    event_id: &str,
    sink: &MutationSink,
) -> bool {
    match sink
        .until_cancelled(leaderboards.fetch_leaderboard(event_id))
        .await
    {
        None => false,
        Some(Ok(leaderboard)) => sink.submit(Mutation::LeaderboardReplaced(leaderboard)).await,
        Some(Err(err)) => {
            debug!(event_id, error = %err, "leaderboard fetch failed; keeping stale copy");
            true
        }
    }
}
