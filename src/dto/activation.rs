use serde::{Deserialize, Serialize};

/// Body of `POST /activations/{id}/answers`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest<'a> {
    /// Chosen option.
    pub option_id: &'a str,
}

/// Body of `POST /activations/{id}/noise-meter`.
#[derive(Debug, Serialize)]
pub struct NoiseMeterRequest {
    /// Measured level as reported by the device.
    pub level: f64,
}

/// Authoritative points balance returned after an activation submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdate {
    /// Balance after the submission was scored.
    pub new_balance: i64,
}
