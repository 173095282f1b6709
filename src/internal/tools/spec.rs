use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::internal::tools::result::ToolResult;

/// Keyword arguments passed to a tool.
pub type ToolArgs = Map<String, Value>;

/// A named capability the agent can invoke.
///
/// Implementations may report failures either as `Ok(ToolResult::failure(..))`
/// or as `Err(ToolError)`; the agent normalizes both into a failure envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute(&self, args: ToolArgs) -> Result<ToolResult, ToolError>;
}

/// Name and description of a registered tool, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

impl ToolInfo {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}

/// Deserialize keyword arguments into a tool's argument struct.
pub fn parse_args<T: DeserializeOwned>(args: ToolArgs) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("{0}")]
    Execution(String),
}
