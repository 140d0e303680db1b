#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::{
    FutureExt, StreamExt,
    future::{self, BoxFuture},
    stream,
};
use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use gameday_core::{
    Collaborators, Coordinator, GamedaySnapshot, SharedCoordinator,
    config::GamedayTimings,
    dao::{
        error::{ChannelError, LocationError, RepositoryError, RepositoryResult},
        location::{BeaconReading, BeaconStream, LocationService},
        realtime::{FrameStream, RealtimeConnector},
        repository::{
            ActivationRepository, CheckInRepository, EventRepository, LeaderboardRepository,
        },
    },
    dto::{
        activation::BalanceUpdate,
        check_in::{CheckInProof, CheckInReceipt, Coordinates},
    },
    state::event::{
        Activation, ActivationKind, ActivationStatus, Event, EventStatus, Leaderboard,
        LeaderboardEntry, Venue,
    },
};

pub const EVENT_ID: &str = "evt-1";

pub fn event(status: EventStatus, starts_in: time::Duration) -> Event {
    Event {
        id: EVENT_ID.into(),
        sport: "basketball".into(),
        title: "Home vs Away".into(),
        opponent: "Away".into(),
        venue: None,
        start_time: OffsetDateTime::now_utc() + starts_in,
        end_time: None,
        status,
        home_score: 0,
        away_score: 0,
        period: None,
        activations: Vec::new(),
    }
}

pub fn activation(id: &str, status: ActivationStatus, starts_in: time::Duration) -> Activation {
    Activation {
        id: id.into(),
        kind: ActivationKind::Trivia,
        status,
        start_time: Some(OffsetDateTime::now_utc() + starts_in),
        title: None,
    }
}

pub fn venue_with_beacon(uuid: Uuid) -> Venue {
    Venue {
        id: "v1".into(),
        name: "Arena".into(),
        beacon_uuid: Some(uuid),
        beacon_major: None,
        beacon_minor: None,
    }
}

/// Resolves once `gate` is open; stays pending while it is closed.
async fn opened(mut gate: watch::Receiver<bool>) {
    loop {
        let open = *gate.borrow_and_update();
        if open || gate.changed().await.is_err() {
            return;
        }
    }
}

pub struct FakeEvents {
    event: Mutex<Option<Event>>,
    gate: watch::Sender<bool>,
    pub fetches: AtomicUsize,
}

impl Default for FakeEvents {
    fn default() -> Self {
        Self {
            event: Mutex::new(None),
            gate: watch::channel(true).0,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeEvents {
    /// Park every fetch issued from now on until [`Self::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn set(&self, event: Event) {
        *self.event.lock().unwrap() = Some(event);
    }

    pub fn fail(&self) {
        *self.event.lock().unwrap() = None;
    }
}

impl EventRepository for FakeEvents {
    fn fetch_event(&self, event_id: &str) -> BoxFuture<'static, RepositoryResult<Event>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self
            .event
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RepositoryError::NotFound(event_id.to_string()));
        let gate = self.gate.subscribe();
        async move {
            opened(gate).await;
            result
        }
        .boxed()
    }
}

pub enum CheckInOutcome {
    Points(i64),
    Fail(&'static str),
    Delayed(Duration, i64),
    Hang,
}

#[derive(Default)]
pub struct FakeCheckIns {
    outcomes: Mutex<VecDeque<CheckInOutcome>>,
    pub proofs: Mutex<Vec<CheckInProof>>,
}

impl FakeCheckIns {
    pub fn push(&self, outcome: CheckInOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

impl CheckInRepository for FakeCheckIns {
    fn submit_check_in(
        &self,
        _event_id: &str,
        proof: CheckInProof,
    ) -> BoxFuture<'static, RepositoryResult<CheckInReceipt>> {
        self.proofs.lock().unwrap().push(proof);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CheckInOutcome::Points(25));
        match outcome {
            CheckInOutcome::Points(points_earned) => {
                future::ready(Ok(CheckInReceipt { points_earned })).boxed()
            }
            CheckInOutcome::Fail(message) => {
                future::ready(Err(RepositoryError::transport(message))).boxed()
            }
            CheckInOutcome::Delayed(delay, points_earned) => async move {
                tokio::time::sleep(delay).await;
                Ok(CheckInReceipt { points_earned })
            }
            .boxed(),
            CheckInOutcome::Hang => future::pending().boxed(),
        }
    }
}

pub struct FakeActivations {
    pub balance: i64,
    pub fail: AtomicBool,
}

impl FakeActivations {
    fn update(&self, new_balance: i64) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>> {
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(RepositoryError::Status {
                path: "/activations".into(),
                status: 500,
            })
        } else {
            Ok(BalanceUpdate { new_balance })
        };
        future::ready(result).boxed()
    }
}

impl ActivationRepository for FakeActivations {
    fn submit_answer(
        &self,
        _activation_id: &str,
        _option_id: &str,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>> {
        self.update(self.balance)
    }

    fn submit_noise_meter(
        &self,
        _activation_id: &str,
        _level: f64,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>> {
        self.update(self.balance + 1)
    }
}

pub fn board() -> Leaderboard {
    Leaderboard {
        entries: vec![LeaderboardEntry {
            rank: 1,
            user_id: "u1".into(),
            display_name: "Top Fan".into(),
            points: 120,
        }],
        user_rank: Some(7),
    }
}

pub struct FakeLeaderboards {
    gate: watch::Sender<bool>,
    pub fail: AtomicBool,
    pub fetches: AtomicUsize,
}

impl Default for FakeLeaderboards {
    fn default() -> Self {
        Self {
            gate: watch::channel(true).0,
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeLeaderboards {
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }
}

impl LeaderboardRepository for FakeLeaderboards {
    fn fetch_leaderboard(&self, _event_id: &str) -> BoxFuture<'static, RepositoryResult<Leaderboard>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(RepositoryError::transport("leaderboard offline"))
        } else {
            Ok(board())
        };
        let gate = self.gate.subscribe();
        async move {
            opened(gate).await;
            result
        }
        .boxed()
    }
}

pub struct FakeLocation {
    pub fix: Mutex<Option<Coordinates>>,
    pub readings: Mutex<Vec<BeaconReading>>,
    /// Latency of the fix and of every beacon reading.
    pub delay: Mutex<Duration>,
    pub ranging_stops: AtomicUsize,
}

impl Default for FakeLocation {
    fn default() -> Self {
        Self {
            fix: Mutex::new(Some(Coordinates {
                latitude: 39.9,
                longitude: -75.1,
                accuracy: 12.0,
            })),
            readings: Mutex::new(Vec::new()),
            delay: Mutex::new(Duration::ZERO),
            ranging_stops: AtomicUsize::new(0),
        }
    }
}

impl LocationService for FakeLocation {
    fn current_location(&self) -> BoxFuture<'static, Result<Coordinates, LocationError>> {
        let fix = *self.fix.lock().unwrap();
        let delay = *self.delay.lock().unwrap();
        async move {
            tokio::time::sleep(delay).await;
            fix.ok_or_else(|| LocationError::Unavailable("no fix".into()))
        }
        .boxed()
    }

    fn start_beacon_ranging(&self, _uuid: Uuid) -> Result<BeaconStream, LocationError> {
        let readings = self.readings.lock().unwrap().clone();
        let delay = *self.delay.lock().unwrap();
        Ok(stream::iter(readings)
            .then(move |reading| async move {
                tokio::time::sleep(delay).await;
                reading
            })
            .chain(stream::pending())
            .boxed())
    }

    fn stop_beacon_ranging(&self) {
        self.ranging_stops.fetch_add(1, Ordering::SeqCst);
    }
}

type FrameResult = Result<String, ChannelError>;

pub struct FakeRealtime {
    frames: Mutex<Option<mpsc::UnboundedReceiver<FrameResult>>>,
}

impl RealtimeConnector for FakeRealtime {
    fn connect(&self, _event_id: &str) -> BoxFuture<'static, Result<FrameStream, ChannelError>> {
        let result = match self.frames.lock().unwrap().take() {
            Some(rx) => Ok(UnboundedReceiverStream::new(rx).boxed()),
            None => Err(ChannelError::Transport("already connected".into())),
        };
        future::ready(result).boxed()
    }
}

pub struct Harness {
    pub coordinator: SharedCoordinator,
    pub events: Arc<FakeEvents>,
    pub check_ins: Arc<FakeCheckIns>,
    pub activations: Arc<FakeActivations>,
    pub leaderboards: Arc<FakeLeaderboards>,
    pub location: Arc<FakeLocation>,
    pub frames: mpsc::UnboundedSender<FrameResult>,
}

impl Harness {
    pub fn new(event: Option<Event>, poll_interval: Duration) -> Self {
        let events = Arc::new(FakeEvents::default());
        if let Some(event) = event {
            events.set(event);
        }
        let check_ins = Arc::new(FakeCheckIns::default());
        let activations = Arc::new(FakeActivations {
            balance: 500,
            fail: AtomicBool::new(false),
        });
        let leaderboards = Arc::new(FakeLeaderboards::default());
        let location = Arc::new(FakeLocation::default());
        let (frames, rx) = mpsc::unbounded_channel();

        let coordinator = Coordinator::new(
            EVENT_ID,
            Collaborators {
                events: events.clone(),
                check_ins: check_ins.clone(),
                activations: activations.clone(),
                leaderboards: leaderboards.clone(),
                location: location.clone(),
                realtime: Arc::new(FakeRealtime {
                    frames: Mutex::new(Some(rx)),
                }),
            },
            GamedayTimings {
                poll_interval,
                beacon_scan_timeout: Duration::from_millis(50),
                beacon_confirm_pause: Duration::from_millis(10),
            },
        );

        Self {
            coordinator,
            events,
            check_ins,
            activations,
            leaderboards,
            location,
            frames,
        }
    }

    pub fn push(&self, frame: &str) {
        let _ = self.frames.send(Ok(frame.to_string()));
    }

    /// Wait until the published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&GamedaySnapshot) -> bool,
    ) -> GamedaySnapshot {
        wait_on(self.coordinator.subscribe(), predicate).await
    }
}

pub async fn wait_on<T: Clone>(
    mut rx: watch::Receiver<T>,
    predicate: impl FnMut(&T) -> bool,
) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("condition not reached in time")
        .expect("sender dropped")
        .clone()
}

/// Poll `condition` until it holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
