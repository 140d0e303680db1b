use serde::Deserialize;
use thiserror::Error;

use crate::{
    dto::{event::ActivationDto, leaderboard::LeaderboardDto},
    state::event::{Activation, EventStatus, Leaderboard},
};

/// Discriminator of a realtime frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RealtimeMessageType {
    /// `scoreUpdate`
    ScoreUpdate,
    /// `activationStarted`
    ActivationStarted,
    /// `activationEnded`
    ActivationEnded,
    /// `leaderboardUpdate`
    LeaderboardUpdate,
    /// `eventStatusChange`
    EventStatusChange,
}

/// Raw frame as sent on the push connection.
#[derive(Debug, Deserialize)]
struct RealtimeFrame {
    #[serde(rename = "type")]
    kind: RealtimeMessageType,
    #[serde(rename = "eventID")]
    event_id: String,
    #[serde(default)]
    payload: RealtimePayload,
}

/// Union of every payload field; `type` decides which ones are meaningful.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RealtimePayload {
    home_score: Option<u32>,
    away_score: Option<u32>,
    period: Option<String>,
    activation: Option<ActivationDto>,
    leaderboard: Option<LeaderboardDto>,
    event_status: Option<EventStatus>,
}

/// Fact pushed by the realtime channel, consumed once by the mutation funnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeMessage {
    /// Partial score patch; absent fields keep their previous value.
    ScoreUpdate {
        /// Event the frame belongs to.
        event_id: String,
        /// New home score, if changed.
        home_score: Option<u32>,
        /// New away score, if changed.
        away_score: Option<u32>,
        /// New period label, if changed.
        period: Option<String>,
    },
    /// An activation opened.
    ActivationStarted {
        /// Event the frame belongs to.
        event_id: String,
        /// Activation as it is now.
        activation: Activation,
    },
    /// An activation closed.
    ActivationEnded {
        /// Event the frame belongs to.
        event_id: String,
        /// Activation as it is now.
        activation: Activation,
    },
    /// Fresh leaderboard snapshot.
    LeaderboardUpdate {
        /// Event the frame belongs to.
        event_id: String,
        /// Replacement leaderboard.
        leaderboard: Leaderboard,
    },
    /// The event moved to another lifecycle status.
    EventStatusChange {
        /// Event the frame belongs to.
        event_id: String,
        /// New status.
        status: EventStatus,
    },
}

/// Why a frame could not be turned into a [`RealtimeMessage`].
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    /// Not valid JSON, or an unknown `type`.
    #[error("malformed realtime frame")]
    Json(#[from] serde_json::Error),
    /// The `type` requires a payload field that is absent.
    #[error("realtime frame `{kind:?}` is missing payload field `{field}`")]
    MissingField {
        /// Frame type.
        kind: RealtimeMessageType,
        /// Absent payload field.
        field: &'static str,
    },
}

impl RealtimeMessage {
    /// Decode a text frame.
    pub fn from_json_str(raw: &str) -> Result<Self, FrameDecodeError> {
        let frame: RealtimeFrame = serde_json::from_str(raw)?;
        frame.try_into()
    }

    /// Event the message refers to.
    pub fn event_id(&self) -> &str {
        match self {
            Self::ScoreUpdate { event_id, .. }
            | Self::ActivationStarted { event_id, .. }
            | Self::ActivationEnded { event_id, .. }
            | Self::LeaderboardUpdate { event_id, .. }
            | Self::EventStatusChange { event_id, .. } => event_id,
        }
    }
}

impl TryFrom<RealtimeFrame> for RealtimeMessage {
    type Error = FrameDecodeError;

    fn try_from(frame: RealtimeFrame) -> Result<Self, Self::Error> {
        let RealtimeFrame {
            kind,
            event_id,
            payload,
        } = frame;
        let missing = |field| FrameDecodeError::MissingField { kind, field };

        let message = match kind {
            RealtimeMessageType::ScoreUpdate => Self::ScoreUpdate {
                event_id,
                home_score: payload.home_score,
                away_score: payload.away_score,
                period: payload.period,
            },
            RealtimeMessageType::ActivationStarted => Self::ActivationStarted {
                event_id,
                activation: payload.activation.ok_or_else(|| missing("activation"))?.into(),
            },
            RealtimeMessageType::ActivationEnded => Self::ActivationEnded {
                event_id,
                activation: payload.activation.ok_or_else(|| missing("activation"))?.into(),
            },
            RealtimeMessageType::LeaderboardUpdate => Self::LeaderboardUpdate {
                event_id,
                leaderboard: payload
                    .leaderboard
                    .ok_or_else(|| missing("leaderboard"))?
                    .into(),
            },
            RealtimeMessageType::EventStatusChange => Self::EventStatusChange {
                event_id,
                status: payload.event_status.ok_or_else(|| missing("eventStatus"))?,
            },
        };

        Ok(message)
    }
}
