//! Typed projection of the notification body.
//!
//! The build service submits either a JSON object directly or a
//! form-encoded body whose `json` field carries the JSON object. Either
//! way the interesting part is the `BuildVariables` map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Repository URI of the commit that triggered the notification.
pub const VAR_REPOSITORY_URI: &str = "Build.Repository.Uri";

/// Fully-qualified source branch ref, e.g. `refs/heads/master`.
pub const VAR_SOURCE_BRANCH: &str = "Build.SourceBranch";

/// Typed view of the submitted build notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPayload {
    /// Named build variables reported by the build service.
    #[serde(default, rename = "BuildVariables")]
    pub build_variables: BTreeMap<String, String>,
}

impl BuildPayload {
    /// Convert an already-parsed JSON object into a typed payload.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::PayloadFormat(e.to_string()))
    }

    /// Look up a build variable by name.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.build_variables.get(name).map(String::as_str)
    }
}

/// Parse a raw request body into its JSON form plus the typed payload.
///
/// Accepts a bare JSON object, a form-encoded body with a `json` field
/// (how the original build service submits), or an empty body (commands
/// like `ping` need no variables).
pub fn parse_body(raw: &str) -> CoreResult<(Value, BuildPayload)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok((Value::Object(Default::default()), BuildPayload::default()));
    }

    let value: Value = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| CoreError::PayloadFormat(e.to_string()))?
    } else {
        let form: BTreeMap<String, String> = serde_urlencoded::from_str(trimmed)
            .map_err(|e| CoreError::PayloadFormat(e.to_string()))?;
        let json = form
            .get("json")
            .ok_or_else(|| CoreError::PayloadFormat("form body has no 'json' field".into()))?;
        serde_json::from_str(json).map_err(|e| CoreError::PayloadFormat(e.to_string()))?
    };

    if !value.is_object() {
        return Err(CoreError::PayloadFormat(
            "payload must be a JSON object".into(),
        ));
    }

    let payload = BuildPayload::from_value(&value)?;
    Ok((value, payload))
}
