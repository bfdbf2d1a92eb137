//! Messages crossing the sandbox boundary.

use crate::error::CapabilityError;
use plaza_derive::wire_model;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability call issued from inside a sandbox.
#[wire_model]
#[derive(PartialEq)]
pub struct CapabilityRequest {
    pub id: u64,
    /// `"<Api>.<method>"`, e.g. `Players.getPlayerData`.
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<u32>,
}

impl CapabilityRequest {
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self { id, method: method.into(), params, api_version: None }
    }

    #[must_use]
    pub const fn with_api_version(mut self, version: u32) -> Self {
        self.api_version = Some(version);
        self
    }
}

#[wire_model]
#[derive(PartialEq, Eq)]
pub struct ResponseError {
    /// `snake_case` error kind, e.g. `unknown_capability`.
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityOutcome {
    Ok(Value),
    Error(ResponseError),
}

/// Exactly one response is produced per request.
#[wire_model]
#[derive(PartialEq)]
pub struct CapabilityResponse {
    pub id: u64,
    #[serde(flatten)]
    pub outcome: CapabilityOutcome,
}

impl CapabilityResponse {
    #[must_use]
    pub const fn ok(id: u64, value: Value) -> Self {
        Self { id, outcome: CapabilityOutcome::Ok(value) }
    }

    /// Converts an error into its wire form.
    ///
    /// Execution failures are reported generically; their details stay in the host logs.
    #[must_use]
    pub fn error(id: u64, error: &CapabilityError) -> Self {
        let message = match error {
            CapabilityError::Execution { .. } | CapabilityError::Payload { .. } => {
                "Capability execution failed".to_owned()
            },
            other => other.to_string(),
        };
        let kind = match error {
            CapabilityError::Payload { .. } => "execution",
            other => other.kind(),
        };
        Self { id, outcome: CapabilityOutcome::Error(ResponseError { kind: kind.to_owned(), message }) }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.outcome, CapabilityOutcome::Ok(_))
    }

    /// Kind of the error, if the call failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        match &self.outcome {
            CapabilityOutcome::Error(error) => Some(&error.kind),
            CapabilityOutcome::Ok(_) => None,
        }
    }

    /// # Errors
    /// Returns the wire error of a failed call.
    pub fn into_result(self) -> Result<Value, ResponseError> {
        match self.outcome {
            CapabilityOutcome::Ok(value) => Ok(value),
            CapabilityOutcome::Error(error) => Err(error),
        }
    }
}

/// Description of an exposed API.
#[wire_model]
#[derive(PartialEq, Eq)]
pub struct ApiManifest {
    pub name: String,
    pub version: u32,
    pub methods: Vec<String>,
}
