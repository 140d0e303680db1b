use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::dto::validation::validate_finite;

/// Location fix returned by the location collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Degrees, `[-90, 90]`.
    pub latitude: f64,
    /// Degrees, `[-180, 180]`.
    pub longitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy: f64,
}

impl Validate for Coordinates {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let fields = [
            ("latitude", self.latitude, -90.0, 90.0),
            ("longitude", self.longitude, -180.0, 180.0),
            ("accuracy", self.accuracy, 0.0, f64::MAX),
        ];
        for (name, value, min, max) in fields {
            if let Err(e) = validate_finite(value) {
                errors.add(name, e);
            } else if value < min || value > max {
                let mut err = ValidationError::new("range");
                err.message = Some(format!("{name} must be within [{min}, {max}]").into());
                errors.add(name, err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Evidence sent with a check-in, built fresh per attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInProof {
    /// Position fix at the start of the attempt.
    #[validate(nested)]
    pub coordinates: Coordinates,
    /// Accuracy of the fix in meters, repeated at the top level.
    pub accuracy: f64,
    /// Beacon seen during the scan; every beacon field is unset when none was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beacon_uuid: Option<Uuid>,
    /// Major value of the beacon seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beacon_major: Option<u16>,
    /// Minor value of the beacon seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beacon_minor: Option<u16>,
    /// Signal strength of the reading, in dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beacon_rssi: Option<i16>,
    /// Device attestation, filled by the network layer when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_token: Option<String>,
}

impl CheckInProof {
    /// Proof carrying only the GPS fix.
    pub fn from_location(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            accuracy: coordinates.accuracy,
            beacon_uuid: None,
            beacon_major: None,
            beacon_minor: None,
            beacon_rssi: None,
            attestation_token: None,
        }
    }

    /// Whether any beacon field was populated.
    pub fn has_beacon(&self) -> bool {
        self.beacon_uuid.is_some()
            || self.beacon_major.is_some()
            || self.beacon_minor.is_some()
            || self.beacon_rssi.is_some()
    }
}

/// Response of `POST /events/{id}/check-ins`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInReceipt {
    /// Points awarded for this check-in.
    pub points_earned: i64,
}
