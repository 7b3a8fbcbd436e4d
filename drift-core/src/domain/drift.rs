//! Drift event domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only event kind the dispatcher acts on
pub const DRIFT_EVENT: &str = "drift";

/// Inbound notification from a drift detector
///
/// Fields other than `is_drift` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl DriftEvent {
    /// Builds a drift event the way a detector would send it
    pub fn drift(is_drift: bool, p_val: Option<f64>) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert("is_drift".to_string(), Value::Bool(is_drift));
        if let Some(p) = p_val {
            payload.insert("p_val".to_string(), Value::from(p));
        }

        Self {
            event: DRIFT_EVENT.to_string(),
            payload: Value::Object(payload),
        }
    }

    /// `payload.is_drift` (or `payload.isDrift`), only if it is a boolean
    pub fn is_drift(&self) -> Option<bool> {
        self.payload
            .get("is_drift")
            .or_else(|| self.payload.get("isDrift"))
            .and_then(Value::as_bool)
    }

    pub fn p_value(&self) -> Option<f64> {
        self.payload.get("p_val").and_then(Value::as_f64)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.payload.get("timestamp").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_detector_event() {
        let event: DriftEvent = serde_json::from_value(json!({
            "event": "drift",
            "payload": {"is_drift": true, "p_val": 0.001, "timestamp": "2024-05-01T10:00:00Z"}
        }))
        .unwrap();

        assert_eq!(event.event, DRIFT_EVENT);
        assert_eq!(event.is_drift(), Some(true));
        assert_eq!(event.p_value(), Some(0.001));
        assert_eq!(event.timestamp(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_camel_case_alias() {
        let event: DriftEvent =
            serde_json::from_value(json!({"event": "drift", "payload": {"isDrift": false}}))
                .unwrap();
        assert_eq!(event.is_drift(), Some(false));
    }

    #[test]
    fn test_non_boolean_is_drift_is_missing() {
        let event: DriftEvent =
            serde_json::from_value(json!({"event": "drift", "payload": {"is_drift": "yes"}}))
                .unwrap();
        assert_eq!(event.is_drift(), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let event: DriftEvent = serde_json::from_value(json!({})).unwrap();
        assert!(event.event.is_empty());
        assert_eq!(event.is_drift(), None);
    }

    #[test]
    fn test_drift_constructor() {
        let event = DriftEvent::drift(true, Some(0.01));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "drift", "payload": {"is_drift": true, "p_val": 0.01}})
        );
    }
}
