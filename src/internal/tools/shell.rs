use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::internal::tools::{
    result::ToolResult,
    spec::{parse_args, Tool, ToolArgs, ToolError},
};

pub const SHELL_TOOL_NAME: &str = "shell_command";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ShellArgs {
    #[serde(default)]
    command: String,
    /// Seconds, fractions allowed
    timeout: Option<f64>,
}

/// Runs a command through the platform shell and captures its output.
#[derive(Debug, Clone)]
pub struct ShellTool {
    default_timeout: Duration,
}

impl ShellTool {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    };
    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn timeout_from_secs(secs: f64) -> Result<Duration, ToolError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ToolError::InvalidArguments(format!(
            "timeout must be a non-negative number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ToolError::InvalidArguments(format!("timeout {}: {}", secs, e)))
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        SHELL_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Execute shell commands"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolResult, ToolError> {
        let args: ShellArgs = parse_args(args)?;
        let limit = match args.timeout {
            Some(secs) => timeout_from_secs(secs)?,
            None => self.default_timeout,
        };

        let started = Instant::now();
        let child = shell_command(&args.command).spawn()?;

        // Dropping the pending future drops the child, which kills it
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                let secs = limit.as_secs_f64();
                tracing::warn!("Command timed out after {}s: {}", secs, args.command);
                return Ok(ToolResult::failure(format!(
                    "Command timed out after {}s",
                    secs
                )));
            }
        };

        let returncode = output.status.code();
        let data = json!({
            "returncode": returncode,
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        });
        let elapsed_ms = json!(started.elapsed().as_millis() as u64);

        let result = if output.status.success() {
            ToolResult::success(data)
        } else {
            let reason = match returncode {
                Some(code) => format!("Command exited with status {}", code),
                None => "Command terminated by signal".to_string(),
            };
            ToolResult::failure_with_data(reason, data)
        };

        Ok(result.with_metadata("elapsed_ms", elapsed_ms))
    }
}
