use std::fmt;

use serde::Deserialize;

use crate::types::SensorReading;

/// Wire shape accepted from the external transport. Everything optional except
/// the required fields so malformed payloads fail here, not in the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    pub device_id: String,
    pub co: f64,
    pub co2: f64,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reading field '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a raw payload into an immutable [`SensorReading`]. A rejected
/// reading never touches the context window. `received_at_ms` supplies the
/// receipt-time default for an absent timestamp.
pub fn validate_reading(
    raw: RawReading,
    received_at_ms: u64,
) -> Result<SensorReading, ValidationError> {
    if raw.device_id.trim().is_empty() {
        return Err(ValidationError::new("device_id", "must be non-empty"));
    }
    check_channel("co", raw.co)?;
    check_channel("co2", raw.co2)?;

    Ok(SensorReading {
        device_id: raw.device_id,
        co: raw.co,
        co2: raw.co2,
        timestamp_ms: raw.timestamp_ms.unwrap_or(received_at_ms),
        temperature: raw.temperature,
        humidity: raw.humidity,
    })
}

fn check_channel(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(field, "must be non-negative"));
    }
    Ok(())
}

pub fn unix_millis_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{RawReading, validate_reading};

    fn raw(device_id: &str, co: f64, co2: f64) -> RawReading {
        RawReading {
            device_id: device_id.to_string(),
            co,
            co2,
            timestamp_ms: None,
            temperature: None,
            humidity: None,
        }
    }

    #[test]
    fn empty_device_id_is_rejected() {
        let err = validate_reading(raw("  ", 1.0, 400.0), 42).expect_err("must fail");
        assert_eq!(err.field, "device_id");
    }

    #[test]
    fn negative_and_non_finite_channels_are_rejected() {
        assert_eq!(
            validate_reading(raw("dev-1", -0.5, 400.0), 42)
                .expect_err("negative co must fail")
                .field,
            "co"
        );
        assert_eq!(
            validate_reading(raw("dev-1", 1.0, f64::NAN), 42)
                .expect_err("nan co2 must fail")
                .field,
            "co2"
        );
    }

    #[test]
    fn absent_timestamp_defaults_to_receipt_time() {
        let reading = validate_reading(raw("dev-1", 1.0, 400.0), 1_700_000_000_000)
            .expect("valid reading should pass");
        assert_eq!(reading.timestamp_ms, 1_700_000_000_000);
    }
}
