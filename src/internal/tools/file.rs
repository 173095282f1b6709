use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::internal::tools::{
    result::ToolResult,
    spec::{parse_args, Tool, ToolArgs, ToolError},
};

pub const FILE_TOOL_NAME: &str = "file_operations";

#[derive(Debug, Deserialize)]
struct FileArgs {
    #[serde(default = "default_action")]
    action: String,
    #[serde(default)]
    filepath: String,
    #[serde(default)]
    content: String,
}

fn default_action() -> String {
    "read".to_string()
}

/// Reads, writes and checks files on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileTool;

#[async_trait]
impl Tool for FileTool {
    fn name(&self) -> &str {
        FILE_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Read and write files"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolResult, ToolError> {
        let args: FileArgs = parse_args(args)?;

        match args.action.as_str() {
            "read" => {
                let content = tokio::fs::read_to_string(&args.filepath).await?;
                Ok(ToolResult::success(json!({ "content": content })))
            }
            "write" => {
                tokio::fs::write(&args.filepath, args.content.as_bytes()).await?;
                Ok(ToolResult::success(json!({
                    "message": format!("File written: {}", args.filepath)
                })))
            }
            "exists" => {
                let exists = tokio::fs::metadata(&args.filepath).await.is_ok();
                Ok(ToolResult::success(json!({ "exists": exists })))
            }
            other => Ok(ToolResult::failure(format!("Unknown action: {}", other))),
        }
    }
}
