/// Event, venue, activation and leaderboard types.
pub mod event;
/// Gameday phase resolution.
pub mod phase;
pub mod reconciler;
/// Check-in flow states and their transition table.
pub mod state_machine;
/// Mutations and how the snapshot applies them.
pub mod transitions;

use serde::Serialize;

pub use self::phase::Phase;
pub use self::state_machine::{CheckInFlowState, InvalidTransition};
pub use self::transitions::Mutation;
use self::event::{Activation, Event, Leaderboard};

/// Authoritative gameday state, written only by the session's mutation funnel.
///
/// Observers receive clones through a `watch` channel; `phase` and
/// `active_activation` are derived and refreshed after every applied mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamedaySnapshot {
    /// Event as last loaded, refreshed or patched. `None` until the first successful fetch.
    pub event: Option<Event>,
    /// First active activation in list order.
    pub active_activation: Option<Activation>,
    /// Derived gameday phase.
    pub phase: Phase,
    /// Whether the fan checked in during this session.
    pub checked_in: bool,
    /// Fan points balance as last known.
    pub points_balance: i64,
    /// Leaderboard as last fetched or pushed.
    pub leaderboard: Option<Leaderboard>,
    /// Error from the initial event fetch, shown without blocking the screen.
    pub load_error: Option<String>,
    /// Incremented on every applied mutation.
    pub version: u64,
}

/// Compact view of a snapshot, suitable for structured logs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary<'a> {
    /// Snapshot version.
    pub version: u64,
    /// Derived phase.
    pub phase: Phase,
    /// Check-in recorded this session.
    pub checked_in: bool,
    /// Points balance.
    pub points_balance: i64,
    /// Home score, once an event is loaded.
    pub home_score: Option<u32>,
    /// Away score, once an event is loaded.
    pub away_score: Option<u32>,
    /// Identity of the active activation.
    pub active_activation: Option<&'a str>,
    /// Initial load error, if any.
    pub load_error: Option<&'a str>,
}

impl GamedaySnapshot {
    /// Borrowing summary of the fields worth logging.
    pub fn summary(&self) -> SnapshotSummary<'_> {
        SnapshotSummary {
            version: self.version,
            phase: self.phase,
            checked_in: self.checked_in,
            points_balance: self.points_balance,
            home_score: self.event.as_ref().map(|event| event.home_score),
            away_score: self.event.as_ref().map(|event| event.away_score),
            active_activation: self
                .active_activation
                .as_ref()
                .map(|activation| activation.id.as_str()),
            load_error: self.load_error.as_deref(),
        }
    }
}
