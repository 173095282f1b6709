use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::internal::tools::spec::ToolError;

const UNKNOWN_ERROR: &str = "unknown error";

/// Uniform outcome of a tool invocation.
///
/// `error` is present exactly when `success` is false. Fields are private so
/// that the only way to build one is through the constructors below, which
/// keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawToolResult")]
pub struct ToolResult {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
    metadata: Map<String, Value>,
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data).filter(|v| !v.is_null()),
            error: None,
            metadata: Map::new(),
        }
    }

    pub fn success_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            metadata: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(non_empty(error.into())),
            metadata: Map::new(),
        }
    }

    /// Failure that still carries a diagnostic payload, e.g. the captured
    /// output of a process that exited non-zero.
    pub fn failure_with_data(error: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(non_empty(error.into())),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Collapses an execution outcome into an envelope. A fault becomes a
    /// failure whose message is the fault's description.
    pub fn from_outcome(outcome: Result<ToolResult, ToolError>) -> Self {
        match outcome {
            Ok(result) => result,
            Err(e) => Self::failure(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// JSON form used when the envelope is written into memory.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "success": self.success,
            "data": self.data.clone().unwrap_or(Value::Null),
            "error": self.error,
            "metadata": Value::Object(self.metadata.clone()),
        })
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[derive(Deserialize)]
struct RawToolResult {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Successful result must not carry an error")]
    ErrorOnSuccess,
    #[error("Failed result must carry an error message")]
    MissingError,
}

impl TryFrom<RawToolResult> for ToolResult {
    type Error = EnvelopeError;

    fn try_from(raw: RawToolResult) -> Result<Self, Self::Error> {
        match (raw.success, &raw.error) {
            (true, Some(_)) => return Err(EnvelopeError::ErrorOnSuccess),
            (false, None) => return Err(EnvelopeError::MissingError),
            _ => {}
        }

        Ok(Self {
            success: raw.success,
            // `null` data deserializes the same as absent data
            data: raw.data.filter(|v| !v.is_null()),
            error: raw.error,
            metadata: raw.metadata,
        })
    }
}
