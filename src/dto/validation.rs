//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects NaN and infinite readings, which `range` checks let through.
///
/// # Examples
///
/// ```ignore
/// validate_finite(12.5)          // Ok
/// validate_finite(f64::NAN)      // Err
/// validate_finite(f64::INFINITY) // Err
/// ```
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        return Ok(());
    }

    let mut err = ValidationError::new("not_finite");
    err.message = Some(format!("reading must be a finite number (got {value})").into());
    Err(err)
}
