use serde::Serialize;
use thiserror::Error;

/// Progress of a check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CheckInFlowState {
    /// No attempt running.
    #[default]
    Idle,
    /// Waiting for a location fix.
    VerifyingLocation,
    /// Looking for the venue beacon, bounded by a timeout.
    ScanningBeacon,
    /// A venue beacon answered; shown briefly before submitting.
    BeaconFound,
    /// Proof sent to the backend.
    Submitting,
    /// Check-in accepted.
    #[serde(rename_all = "camelCase")]
    Success {
        /// Points credited for checking in.
        points_earned: i64,
    },
    /// Attempt failed; only an explicit reset or a new attempt leaves this state.
    Failed {
        /// Human-readable reason.
        message: String,
    },
}

impl CheckInFlowState {
    /// Whether a new attempt may start from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }

    /// Whether the attempt reached an outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failed { .. })
    }
}

/// Requested transition is not part of the forward-only check-in path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid check-in transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    /// State the machine was in.
    pub from: CheckInFlowState,
    /// State that was requested.
    pub to: CheckInFlowState,
}

/// Validate a transition and return the next state.
///
/// `idle|failed → verifyingLocation → scanningBeacon → [beaconFound →] submitting
/// → success|failed`, any in-flight step may fail, and `failed → idle` is the
/// reset.
pub fn transition(
    from: &CheckInFlowState,
    to: CheckInFlowState,
) -> Result<CheckInFlowState, InvalidTransition> {
    use CheckInFlowState::*;

    let allowed = matches!(
        (from, &to),
        (Idle | Failed { .. }, VerifyingLocation)
            | (VerifyingLocation, ScanningBeacon)
            | (ScanningBeacon, BeaconFound | Submitting)
            | (BeaconFound, Submitting)
            | (Submitting, Success { .. })
            | (
                VerifyingLocation | ScanningBeacon | BeaconFound | Submitting,
                Failed { .. }
            )
            | (Failed { .. }, Idle)
    );

    if allowed {
        Ok(to)
    } else {
        Err(InvalidTransition {
            from: from.clone(),
            to,
        })
    }
}
