use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::event::{ActivationKind, ActivationStatus, EventStatus};

/// Event document returned by `GET /events/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Backend identifier.
    pub id: String,
    /// Sport label.
    pub sport: String,
    /// Display title.
    pub title: String,
    /// Opposing team.
    #[serde(default)]
    pub opponent: String,
    /// Venue, when assigned.
    #[serde(default)]
    pub venue: Option<VenueDto>,
    /// Scheduled start.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Scheduled or actual end.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Home score.
    #[serde(default)]
    pub home_score: u32,
    /// Away score.
    #[serde(default)]
    pub away_score: u32,
    /// Current period label.
    #[serde(default)]
    pub period: Option<String>,
    /// Activations in backend order.
    #[serde(default)]
    pub activations: Vec<ActivationDto>,
}

/// Venue reference embedded in an event document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDto {
    /// Venue identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Proximity UUID of the venue beacons.
    #[serde(default)]
    pub beacon_uuid: Option<Uuid>,
    /// Pinned major value.
    #[serde(default)]
    pub beacon_major: Option<u16>,
    /// Pinned minor value.
    #[serde(default)]
    pub beacon_minor: Option<u16>,
}

/// Activation as carried by event documents and realtime frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationDto {
    /// Activation identifier.
    pub id: String,
    /// Kind, sent as `type`.
    #[serde(rename = "type", alias = "kind")]
    pub kind: ActivationKind,
    /// Lifecycle status.
    pub status: ActivationStatus,
    /// Opening time, when scheduled.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Headline.
    #[serde(default)]
    pub title: Option<String>,
}
