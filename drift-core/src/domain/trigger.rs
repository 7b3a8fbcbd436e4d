//! Pipeline trigger domain types

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigError;

/// Fixed API path between the CI base URL and the project id
pub const PROJECT_API_PATH: &str = "api/v4/projects";

/// Enables the retrain stage of the pipeline
pub const TRIGGER_RETRAIN: &str = "TRIGGER_RETRAIN";
/// Marks the run as caused by detected drift
pub const DRIFT_DETECTED: &str = "DRIFT_DETECTED";
/// Where pipeline stages should post their own notifications
pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
/// Raw detector payload (JSON) forwarded to the pipeline
pub const DRIFT_PAYLOAD: &str = "DRIFT_PAYLOAD";

/// Trigger credential
///
/// Serializes to the raw value (the CI API needs it), but never prints it.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct TriggerToken(String);

impl TriggerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for TriggerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TriggerToken(***)")
    }
}

impl fmt::Display for TriggerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for TriggerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<String> for TriggerToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named string parameters passed into a pipeline run
///
/// Keys are unique; iteration order is by name so the request body is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerVariables(BTreeMap<String, String>);

impl TriggerVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `TRIGGER_RETRAIN=true` when `enabled`, otherwise leaves it absent
    pub fn retrain(self, enabled: bool) -> Self {
        self.flag(TRIGGER_RETRAIN, enabled)
    }

    /// Sets `DRIFT_DETECTED=true` when `detected`, otherwise leaves it absent
    pub fn drift_detected(self, detected: bool) -> Self {
        self.flag(DRIFT_DETECTED, detected)
    }

    /// Sets `SLACK_WEBHOOK_URL` when a non-empty URL is given
    pub fn slack_webhook_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.0.insert(SLACK_WEBHOOK_URL.to_string(), url.to_string());
        }
        self
    }

    /// Forwards the detector payload as compact JSON
    pub fn drift_payload(mut self, payload: &Value) -> Self {
        if !payload.is_null() {
            self.0
                .insert(DRIFT_PAYLOAD.to_string(), payload.to_string());
        }
        self
    }

    /// Insert an arbitrary variable, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Variables in the `variables[NAME]` form the trigger API expects
    pub fn namespaced(&self) -> impl Iterator<Item = (String, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (format!("variables[{}]", name), value.as_str()))
    }

    fn flag(mut self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.0.insert(name.to_string(), "true".to_string());
        }
        self
    }
}

/// Intent to start a pipeline run
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    /// Base URL of the CI system (e.g., "https://gitlab.com")
    pub endpoint_base: String,
    /// Target project, numeric id or `group/project` path
    pub project_id: String,
    pub token: TriggerToken,
    /// Branch or tag to run against
    pub git_ref: String,
    pub variables: TriggerVariables,
}

impl TriggerRequest {
    /// Checks everything that must hold before a network call is attempted
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Missing("project id"));
        }

        if self.token.is_empty() {
            return Err(ConfigError::Missing("trigger token"));
        }

        if self.endpoint_base.trim().is_empty() {
            return Err(ConfigError::Missing("CI base URL"));
        }

        if self.git_ref.trim().is_empty() {
            return Err(ConfigError::Missing("ref"));
        }

        if let Some(name) = self.variables.names().find(|n| !is_valid_variable_name(n)) {
            return Err(ConfigError::Invalid(format!(
                "invalid pipeline variable name: {:?}",
                name
            )));
        }

        Ok(())
    }

    /// `{base}/api/v4/projects/{id}/trigger/pipeline`
    pub fn trigger_url(&self) -> String {
        format!(
            "{}/{}/{}/trigger/pipeline",
            base_url(&self.endpoint_base),
            PROJECT_API_PATH,
            self.project_id.trim().replace('/', "%2F")
        )
    }

    /// Request body with each variable individually namespaced
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "token".to_string(),
            Value::String(self.token.expose().to_string()),
        );
        body.insert("ref".to_string(), Value::String(self.git_ref.clone()));
        for (key, value) in self.variables.namespaced() {
            body.insert(key, Value::String(value.to_string()));
        }
        Value::Object(body)
    }
}

/// Outcome of a trigger the CI system accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResult {
    pub http_status: u16,
    pub pipeline_id: Option<u64>,
    pub pipeline_url: Option<String>,
    /// Unparsed response body, kept for diagnostics
    pub raw_body: String,
}

impl TriggerResult {
    /// Builds a result from an accepted response, scanning the body for `id`
    pub fn from_response(request: &TriggerRequest, http_status: u16, raw_body: String) -> Self {
        let pipeline_id = extract_pipeline_id(&raw_body);
        let pipeline_url = pipeline_id
            .map(|id| pipeline_url(&request.endpoint_base, &request.project_id, id));

        Self {
            http_status,
            pipeline_id,
            pipeline_url,
            raw_body,
        }
    }
}

/// `{base}/{project_id}/-/pipelines/{id}`
pub fn pipeline_url(endpoint_base: &str, project_id: &str, pipeline_id: u64) -> String {
    format!(
        "{}/{}/-/pipelines/{}",
        base_url(endpoint_base),
        project_id.trim(),
        pipeline_id
    )
}

/// Reads a numeric top-level `id` from a JSON body; anything else yields `None`
pub fn extract_pipeline_id(body: &str) -> Option<u64> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("id")?
        .as_u64()
}

fn base_url(endpoint_base: &str) -> &str {
    endpoint_base.trim().trim_end_matches('/')
}

fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
