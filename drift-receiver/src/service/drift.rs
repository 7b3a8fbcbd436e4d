//! Drift Event Validation
//!
//! Turns a raw request body into an accepted drift event, or rejects it
//! before any credential or network resource is touched.

use drift_core::domain::drift::{DRIFT_EVENT, DriftEvent};
use serde_json::Value;
use std::fmt;

/// Why an inbound body was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not JSON, or not a JSON object
    Malformed(String),
    /// `event` is not `"drift"`
    UnsupportedEvent(String),
    /// `payload.is_drift` absent or not a boolean
    MissingIsDrift,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Malformed(_) => f.write_str("malformed payload"),
            ValidationError::UnsupportedEvent(_) => f.write_str("unsupported event"),
            ValidationError::MissingIsDrift => f.write_str("missing isDrift"),
        }
    }
}

/// A drift event that passed validation
#[derive(Debug, Clone)]
pub struct AcceptedEvent {
    pub event: DriftEvent,
    pub is_drift: bool,
}

/// Validate in order: parseable, drift kind, boolean `is_drift`
pub fn validate_event(body: &[u8]) -> Result<AcceptedEvent, ValidationError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(ValidationError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    match fields.get("event") {
        Some(Value::String(kind)) if kind == DRIFT_EVENT => {}
        Some(Value::String(kind)) => return Err(ValidationError::UnsupportedEvent(kind.clone())),
        Some(other) => return Err(ValidationError::UnsupportedEvent(other.to_string())),
        None => return Err(ValidationError::UnsupportedEvent(String::new())),
    }

    let event = DriftEvent {
        event: DRIFT_EVENT.to_string(),
        payload: fields.remove("payload").unwrap_or(Value::Null),
    };
    let is_drift = event.is_drift().ok_or(ValidationError::MissingIsDrift)?;

    Ok(AcceptedEvent { event, is_drift })
}
