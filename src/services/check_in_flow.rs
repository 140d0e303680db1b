use std::sync::Arc;

use futures::StreamExt;
use tokio::{
    sync::watch,
    time::{sleep, timeout},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::GamedayTimings,
    dao::{
        location::{BeaconReading, LocationService},
        repository::CheckInRepository,
    },
    dto::check_in::CheckInProof,
    state::{
        CheckInFlowState, InvalidTransition, event::Venue, state_machine::transition,
    },
};

const CANCELLED_MESSAGE: &str = "check-in cancelled";

/// Drives one check-in attempt through the flow state machine.
///
/// The state lives in a `watch` channel so observers can follow each step;
/// every change goes through [`transition`], so illegal jumps are impossible.
pub struct CheckInFlowController {
    state: watch::Sender<CheckInFlowState>,
    location: Arc<dyn LocationService>,
    check_ins: Arc<dyn CheckInRepository>,
    timings: GamedayTimings,
}

impl CheckInFlowController {
    /// Idle controller.
    pub fn new(
        location: Arc<dyn LocationService>,
        check_ins: Arc<dyn CheckInRepository>,
        timings: GamedayTimings,
    ) -> Self {
        let (state, _) = watch::channel(CheckInFlowState::Idle);
        Self {
            state,
            location,
            check_ins,
            timings,
        }
    }

    /// Current flow state.
    pub fn state(&self) -> CheckInFlowState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every step.
    pub fn subscribe(&self) -> watch::Receiver<CheckInFlowState> {
        self.state.subscribe()
    }

    /// Claim the flow for a new attempt. `false` when one is in flight or the
    /// fan already succeeded.
    pub fn begin(&self) -> bool {
        self.advance(CheckInFlowState::VerifyingLocation).is_ok()
    }

    /// Return a failed flow to idle. `false` from any other state.
    pub fn reset(&self) -> bool {
        self.advance(CheckInFlowState::Idle).is_ok()
    }

    /// Forget a finished attempt so a new session starts from idle.
    /// In-flight attempts are left alone.
    pub fn discard_finished(&self) {
        self.state.send_if_modified(|current| {
            if current.is_terminal() {
                *current = CheckInFlowState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Run an attempt previously claimed with [`Self::begin`] to its terminal state.
    pub async fn run(
        &self,
        event_id: &str,
        venue: Option<&Venue>,
        cancel: &CancellationToken,
    ) -> CheckInFlowState {
        let attempt_id = Uuid::new_v4();
        info!(%attempt_id, event_id, "check-in started");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CANCELLED_MESSAGE.to_string()),
            result = self.attempt(event_id, venue, attempt_id) => result,
        };

        let terminal = match outcome {
            Ok(points_earned) => {
                info!(%attempt_id, points_earned, "check-in succeeded");
                CheckInFlowState::Success { points_earned }
            }
            Err(message) => {
                warn!(%attempt_id, %message, "check-in failed");
                CheckInFlowState::Failed { message }
            }
        };

        if let Err(err) = self.advance(terminal) {
            warn!(%attempt_id, error = %err, "check-in outcome rejected by flow");
        }
        self.state()
    }

    async fn attempt(
        &self,
        event_id: &str,
        venue: Option<&Venue>,
        attempt_id: Uuid,
    ) -> Result<i64, String> {
        let coordinates = self
            .location
            .current_location()
            .await
            .map_err(|err| err.to_string())?;
        let mut proof = CheckInProof::from_location(coordinates);
        proof
            .validate()
            .map_err(|err| format!("invalid location fix: {err}"))?;

        self.step(CheckInFlowState::ScanningBeacon)?;

        if let Some(reading) = self.scan_for_beacon(venue, attempt_id).await {
            self.step(CheckInFlowState::BeaconFound)?;
            proof.beacon_uuid = Some(reading.uuid);
            proof.beacon_major = Some(reading.major);
            proof.beacon_minor = Some(reading.minor);
            proof.beacon_rssi = Some(reading.rssi);
            sleep(self.timings.beacon_confirm_pause).await;
        }

        self.step(CheckInFlowState::Submitting)?;
        debug!(%attempt_id, with_beacon = proof.has_beacon(), "submitting check-in proof");

        let receipt = self
            .check_ins
            .submit_check_in(event_id, proof)
            .await
            .map_err(|err| err.to_string())?;
        Ok(receipt.points_earned)
    }

    /// Wait up to the scan timeout for a reading from the venue's beacon.
    /// Absence of a beacon is not an error; the proof just goes out GPS-only.
    async fn scan_for_beacon(
        &self,
        venue: Option<&Venue>,
        attempt_id: Uuid,
    ) -> Option<BeaconReading> {
        let Some((venue, uuid)) = venue.and_then(|venue| venue.beacon_uuid.map(|uuid| (venue, uuid)))
        else {
            debug!(%attempt_id, "venue has no beacon; skipping scan");
            return None;
        };

        let mut readings = match self.location.start_beacon_ranging(uuid) {
            Ok(readings) => readings,
            Err(err) => {
                warn!(%attempt_id, error = %err, "beacon ranging unavailable");
                self.location.stop_beacon_ranging();
                return None;
            }
        };
        let _ranging = RangingGuard(self.location.as_ref());

        let first_match = async {
            while let Some(reading) = readings.next().await {
                if matches_venue(venue, uuid, &reading) {
                    return Some(reading);
                }
            }
            None
        };

        match timeout(self.timings.beacon_scan_timeout, first_match).await {
            Ok(Some(reading)) => {
                debug!(%attempt_id, rssi = reading.rssi, "venue beacon found");
                Some(reading)
            }
            Ok(None) => {
                debug!(%attempt_id, "beacon ranging ended without a match");
                None
            }
            Err(_) => {
                debug!(%attempt_id, "no venue beacon before timeout");
                None
            }
        }
    }

    fn step(&self, next: CheckInFlowState) -> Result<(), String> {
        self.advance(next).map_err(|err| err.to_string())
    }

    fn advance(&self, next: CheckInFlowState) -> Result<(), InvalidTransition> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|current| match transition(current, next) {
            Ok(next) => {
                *current = next;
                true
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome
    }
}

fn matches_venue(venue: &Venue, uuid: Uuid, reading: &BeaconReading) -> bool {
    reading.uuid == uuid
        && venue.beacon_major.is_none_or(|major| major == reading.major)
        && venue.beacon_minor.is_none_or(|minor| minor == reading.minor)
}

/// Stops ranging when the scan ends, including when the attempt is dropped mid-scan.
struct RangingGuard<'a>(&'a dyn LocationService);

impl Drop for RangingGuard<'_> {
    fn drop(&mut self) {
        self.0.stop_beacon_ranging();
    }
}
