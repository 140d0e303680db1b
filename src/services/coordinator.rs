use std::sync::Arc;

use tokio::{
    sync::{Mutex, oneshot, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::GamedayTimings,
    dao::{
        location::LocationService,
        realtime::RealtimeConnector,
        repository::{
            ActivationRepository, CheckInRepository, EventRepository, LeaderboardRepository,
        },
    },
    error::ServiceError,
    services::{
        check_in_flow::CheckInFlowController,
        fallback_poller::{self, FallbackPoller, PollerState},
        funnel::{self, MutationSink},
        realtime_channel::{ChannelState, RealtimeChannel},
    },
    state::{CheckInFlowState, GamedaySnapshot, Mutation},
};

/// Shared handle to a [`Coordinator`].
pub type SharedCoordinator = Arc<Coordinator>;

/// Backend and device collaborators the coordinator consumes.
#[derive(Clone)]
pub struct Collaborators {
    /// Event documents, for the initial load and every poll.
    pub events: Arc<dyn EventRepository>,
    /// Check-in submission.
    pub check_ins: Arc<dyn CheckInRepository>,
    /// Answer and noise-meter submission.
    pub activations: Arc<dyn ActivationRepository>,
    /// Leaderboard snapshots.
    pub leaderboards: Arc<dyn LeaderboardRepository>,
    /// Position and beacon ranging for check-in.
    pub location: Arc<dyn LocationService>,
    /// Push connection.
    pub realtime: Arc<dyn RealtimeConnector>,
}

/// Work owned by one visibility period of the gameday screen.
struct Session {
    sink: MutationSink,
    tasks: Vec<JoinHandle<()>>,
}

/// Producers launched by a session, in start order.
struct SessionStartup {
    event_id: String,
    events: Arc<dyn EventRepository>,
    leaderboards: Arc<dyn LeaderboardRepository>,
    channel: RealtimeChannel,
    poller: FallbackPoller,
}

impl SessionStartup {
    /// Initial load first; realtime, polling and the leaderboard fetch only
    /// start after it. Every await observes the session token.
    async fn run(self, sink: MutationSink, loaded: oneshot::Sender<()>) {
        let event_id = self.event_id.as_str();

        let Some(initial) = sink.until_cancelled(self.events.fetch_event(event_id)).await else {
            debug!(event_id, "session torn down during initial load");
            return;
        };
        let mutation = match initial {
            Ok(event) => Mutation::EventLoaded(event),
            Err(err) => {
                warn!(event_id, error = %err, "initial event load failed");
                Mutation::LoadFailed(err.to_string())
            }
        };
        if !sink.submit(mutation).await {
            return;
        }
        let _ = loaded.send(());

        tokio::join!(
            self.channel.run(sink.clone()),
            self.poller.run(sink.clone()),
            fallback_poller::refresh_leaderboard(self.leaderboards.as_ref(), event_id, &sink),
        );
    }
}

/// Owns the gameday snapshot of one event and every background producer feeding it.
///
/// Visibility drives the lifecycle: [`Coordinator::on_appear`] starts a session
/// (initial load, realtime channel, fallback poller, leaderboard fetch) and
/// [`Coordinator::on_disappear`] tears it down. All state changes funnel through
/// a single writer task; background tasks only hold a [`MutationSink`], never
/// the coordinator itself.
pub struct Coordinator {
    event_id: String,
    timings: GamedayTimings,
    events: Arc<dyn EventRepository>,
    activations: Arc<dyn ActivationRepository>,
    leaderboards: Arc<dyn LeaderboardRepository>,
    realtime: Arc<dyn RealtimeConnector>,
    snapshot: Arc<watch::Sender<GamedaySnapshot>>,
    channel_state: Arc<watch::Sender<ChannelState>>,
    poller_state: Arc<watch::Sender<PollerState>>,
    check_in: CheckInFlowController,
    session: Mutex<Option<Session>>,
}

impl Coordinator {
    /// Coordinator for `event_id`; nothing runs until [`Coordinator::on_appear`].
    pub fn new(
        event_id: impl Into<String>,
        collaborators: Collaborators,
        timings: GamedayTimings,
    ) -> SharedCoordinator {
        let Collaborators {
            events,
            check_ins,
            activations,
            leaderboards,
            location,
            realtime,
        } = collaborators;

        Arc::new(Self {
            event_id: event_id.into(),
            timings,
            events,
            activations,
            leaderboards,
            realtime,
            snapshot: Arc::new(watch::channel(GamedaySnapshot::default()).0),
            channel_state: Arc::new(watch::channel(ChannelState::Idle).0),
            poller_state: Arc::new(watch::channel(PollerState::Stopped).0),
            check_in: CheckInFlowController::new(location, check_ins, timings),
            session: Mutex::new(None),
        })
    }

    /// Event this coordinator is bound to.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Start a session: load the event, then launch the realtime channel, the
    /// fallback poller and an initial leaderboard fetch. No-op while visible.
    ///
    /// Returns once the initial load has been queued, or as soon as the
    /// session is torn down while it is still pending.
    pub async fn on_appear(&self) {
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            debug!(event_id = %self.event_id, "gameday screen already visible");
            return;
        }

        info!(event_id = %self.event_id, "gameday screen appeared; starting session");
        self.snapshot.send_replace(GamedaySnapshot::default());
        self.check_in.discard_finished();

        let (sink, funnel_task) = funnel::spawn(self.snapshot.clone(), CancellationToken::new());
        let (loaded_tx, loaded_rx) = oneshot::channel();

        let startup = SessionStartup {
            event_id: self.event_id.clone(),
            events: self.events.clone(),
            leaderboards: self.leaderboards.clone(),
            channel: RealtimeChannel::new(
                self.event_id.clone(),
                self.realtime.clone(),
                self.channel_state.clone(),
            ),
            poller: FallbackPoller::new(
                self.event_id.clone(),
                self.timings.poll_interval,
                self.events.clone(),
                self.leaderboards.clone(),
                self.poller_state.clone(),
            ),
        };
        let startup_task = tokio::spawn(startup.run(sink.clone(), loaded_tx));

        *slot = Some(Session {
            sink,
            tasks: vec![funnel_task, startup_task],
        });
        drop(slot);

        // Err means the session went away before the load finished.
        let _ = loaded_rx.await;
    }

    /// Tear the session down and wait until every task of it has stopped.
    ///
    /// Once this returns the snapshot no longer changes until the next appear.
    pub async fn on_disappear(&self) {
        let Some(session) = self.session.lock().await.take() else {
            debug!(event_id = %self.event_id, "gameday screen was not visible");
            return;
        };

        session.sink.close();
        for task in session.tasks {
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!(event_id = %self.event_id, error = %err, "session task panicked");
                }
            }
        }

        info!(event_id = %self.event_id, "gameday screen disappeared; session stopped");
    }

    /// Whether a session is running.
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Run a check-in attempt to completion.
    ///
    /// Returns `None` without doing anything when no session is running or the
    /// flow is not idle or failed. On success the snapshot records the check-in
    /// and the points earned.
    pub async fn start_check_in(&self) -> Option<CheckInFlowState> {
        let sink = match self.current_sink().await {
            Ok(sink) => sink,
            Err(_) => {
                debug!(event_id = %self.event_id, "check-in ignored; session inactive");
                return None;
            }
        };

        if !self.check_in.begin() {
            debug!(
                event_id = %self.event_id,
                state = ?self.check_in.state(),
                "check-in ignored; attempt in flight or already done"
            );
            return None;
        }

        let venue = self
            .snapshot
            .borrow()
            .event
            .as_ref()
            .and_then(|event| event.venue.clone());

        let outcome = self
            .check_in
            .run(&self.event_id, venue.as_ref(), sink.cancellation())
            .await;

        if let CheckInFlowState::Success { points_earned } = outcome {
            sink.submit(Mutation::CheckedIn { points_earned }).await;
        }
        Some(outcome)
    }

    /// Return a failed check-in to idle. `false` from any other state.
    pub fn reset_check_in(&self) -> bool {
        self.check_in.reset()
    }

    /// Answer a trivia, prediction or poll activation; returns the new balance.
    pub async fn submit_answer(
        &self,
        activation_id: &str,
        option_id: &str,
    ) -> Result<i64, ServiceError> {
        let sink = self.current_sink().await?;
        let update = self
            .activations
            .submit_answer(activation_id, option_id)
            .await?;

        debug!(activation_id, new_balance = update.new_balance, "answer accepted");
        sink.submit(Mutation::BalanceReplaced(update.new_balance))
            .await;
        Ok(update.new_balance)
    }

    /// Report a noise-meter level; returns the new balance.
    pub async fn submit_noise_meter(
        &self,
        activation_id: &str,
        level: f64,
    ) -> Result<i64, ServiceError> {
        let sink = self.current_sink().await?;
        let update = self
            .activations
            .submit_noise_meter(activation_id, level)
            .await?;

        debug!(activation_id, level, new_balance = update.new_balance, "noise level accepted");
        sink.submit(Mutation::BalanceReplaced(update.new_balance))
            .await;
        Ok(update.new_balance)
    }

    /// Re-fetch the leaderboard on demand. Failures keep the stale copy.
    pub async fn load_leaderboard(&self) {
        let Ok(sink) = self.current_sink().await else {
            return;
        };
        fallback_poller::refresh_leaderboard(self.leaderboards.as_ref(), &self.event_id, &sink)
            .await;
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> GamedaySnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified after every applied mutation.
    pub fn subscribe(&self) -> watch::Receiver<GamedaySnapshot> {
        self.snapshot.subscribe()
    }

    /// Snapshots as a stream, starting with the current one.
    pub fn snapshot_stream(&self) -> WatchStream<GamedaySnapshot> {
        WatchStream::new(self.snapshot.subscribe())
    }

    /// Current check-in flow state.
    pub fn check_in_state(&self) -> CheckInFlowState {
        self.check_in.state()
    }

    /// Receiver notified on every check-in flow step.
    pub fn subscribe_check_in(&self) -> watch::Receiver<CheckInFlowState> {
        self.check_in.subscribe()
    }

    /// Realtime channel state of the current or last session.
    pub fn channel_state(&self) -> ChannelState {
        *self.channel_state.borrow()
    }

    /// Receiver notified on realtime channel state changes.
    pub fn subscribe_channel_state(&self) -> watch::Receiver<ChannelState> {
        self.channel_state.subscribe()
    }

    /// Fallback poller state.
    pub fn poller_state(&self) -> PollerState {
        *self.poller_state.borrow()
    }

    /// Receiver notified when the poller starts or stops.
    pub fn subscribe_poller_state(&self) -> watch::Receiver<PollerState> {
        self.poller_state.subscribe()
    }

    async fn current_sink(&self) -> Result<MutationSink, ServiceError> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.sink.clone())
            .ok_or(ServiceError::Inactive)
    }
}
