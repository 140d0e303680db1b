use serde::Serialize;
use time::OffsetDateTime;

use crate::state::event::EventStatus;

/// Single derived value summarising where the fan is in the gameday experience.
///
/// Never stored independently of its inputs: the mutation funnel recomputes it
/// with [`resolve`] after every applied fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Event has not started and check-in is not open yet.
    #[default]
    PreGame,
    /// Check-in is open (start time reached or event live).
    CheckInAvailable,
    /// Fan checked in, event not live yet.
    CheckedIn,
    /// Fan checked in and the event is live.
    Live,
    /// Event completed without a check-in from this fan.
    PostGame,
}

/// Derive the phase from its four inputs. First matching rule wins.
pub fn resolve(
    checked_in: bool,
    status: EventStatus,
    start_time: OffsetDateTime,
    now: OffsetDateTime,
) -> Phase {
    if checked_in && status == EventStatus::Live {
        Phase::Live
    } else if checked_in {
        Phase::CheckedIn
    } else if status == EventStatus::Completed {
        Phase::PostGame
    } else if status == EventStatus::Live || start_time <= now {
        Phase::CheckInAvailable
    } else {
        Phase::PreGame
    }
}
