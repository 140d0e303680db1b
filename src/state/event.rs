use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dto::{
    event::{ActivationDto, EventDto, VenueDto},
    leaderboard::{LeaderboardDto, LeaderboardEntryDto},
};

/// Lifecycle status of the live event as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event has not started yet.
    Upcoming,
    /// The event is in progress.
    Live,
    /// The event is over.
    Completed,
}

/// Lifecycle status of a single activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStatus {
    /// Announced but not open yet.
    Pending,
    /// Currently open for participation.
    Active,
    /// Closed.
    Ended,
}

/// Kind of engagement an activation offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationKind {
    /// Multiple-choice question with a correct answer.
    Trivia,
    /// Guess about an upcoming in-game outcome.
    Prediction,
    /// Opinion poll without a correct answer.
    Poll,
    /// Crowd noise measurement.
    NoiseMeter,
    /// Any kind this client does not know about yet.
    #[serde(other)]
    Other,
}

/// Venue hosting the event, with the optional proximity beacon used during check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    /// Backend identifier of the venue.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Proximity UUID advertised by the venue beacons, if any are installed.
    pub beacon_uuid: Option<Uuid>,
    /// Beacon major value, when the venue pins one.
    pub beacon_major: Option<u16>,
    /// Beacon minor value, when the venue pins one.
    pub beacon_minor: Option<u16>,
}

/// Discrete in-event engagement opportunity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Identity, unique within an event's activation list.
    pub id: String,
    /// What kind of engagement this is.
    pub kind: ActivationKind,
    /// Current lifecycle status.
    pub status: ActivationStatus,
    /// When the activation opens; entries without one sort last.
    pub start_time: Option<OffsetDateTime>,
    /// Optional headline shown to fans.
    pub title: Option<String>,
}

/// Live event displayed on the gameday screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Backend identifier.
    pub id: String,
    /// Sport label (e.g. "basketball").
    pub sport: String,
    /// Display title.
    pub title: String,
    /// Opposing team name.
    pub opponent: String,
    /// Venue reference, when known.
    pub venue: Option<Venue>,
    /// Scheduled start.
    pub start_time: OffsetDateTime,
    /// Scheduled or actual end.
    pub end_time: Option<OffsetDateTime>,
    /// Current lifecycle status.
    pub status: EventStatus,
    /// Home team score.
    pub home_score: u32,
    /// Away team score.
    pub away_score: u32,
    /// Current period label (quarter, half, inning...).
    pub period: Option<String>,
    /// Activations sorted by start time, see [`crate::state::reconciler`].
    pub activations: Vec<Activation>,
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: u32,
    /// Identifier of the ranked fan.
    pub user_id: String,
    /// Name shown on the board.
    pub display_name: String,
    /// Points accumulated for this event.
    pub points: i64,
}

/// Snapshot of the event leaderboard, always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    /// Ranked entries, best first.
    pub entries: Vec<LeaderboardEntry>,
    /// Rank of the current fan, when ranked.
    pub user_rank: Option<u32>,
}

impl From<VenueDto> for Venue {
    fn from(value: VenueDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            beacon_uuid: value.beacon_uuid,
            beacon_major: value.beacon_major,
            beacon_minor: value.beacon_minor,
        }
    }
}

impl From<ActivationDto> for Activation {
    fn from(value: ActivationDto) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            status: value.status,
            start_time: value.start_time,
            title: value.title,
        }
    }
}

impl From<EventDto> for Event {
    fn from(value: EventDto) -> Self {
        Self {
            id: value.id,
            sport: value.sport,
            title: value.title,
            opponent: value.opponent,
            venue: value.venue.map(Into::into),
            start_time: value.start_time,
            end_time: value.end_time,
            status: value.status,
            home_score: value.home_score,
            away_score: value.away_score,
            period: value.period,
            activations: value.activations.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<LeaderboardEntryDto> for LeaderboardEntry {
    fn from(value: LeaderboardEntryDto) -> Self {
        Self {
            rank: value.rank,
            user_id: value.user_id,
            display_name: value.display_name,
            points: value.points,
        }
    }
}

impl From<LeaderboardDto> for Leaderboard {
    fn from(value: LeaderboardDto) -> Self {
        Self {
            entries: value.entries.into_iter().map(Into::into).collect(),
            user_rank: value.user_rank,
        }
    }
}
