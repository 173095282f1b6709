use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

const DEFAULT_CONFIG_PATH: &str = "config/agent.json";
pub const CONFIG_ENV_VAR: &str = "TINY_AGENT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub verbose: bool,
    /// Short tool names (`http`, `file`, `shell`); all tools when absent.
    pub tools: Option<Vec<String>>,
    pub http_timeout_secs: u64,
    pub shell_timeout_secs: u64,
    pub api_addr: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "tiny-agent".to_string(),
            verbose: false,
            tools: None,
            http_timeout_secs: 30,
            shell_timeout_secs: 30,
            api_addr: "0.0.0.0:7777".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn shell_timeout(&self) -> Duration {
        Duration::from_secs(self.shell_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read agent config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid agent config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads the config named by `TINY_AGENT_CONFIG` (or the default path),
/// falling back to defaults when the file is missing or malformed.
pub fn load_config() -> AgentConfig {
    let path = env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match read_config(Path::new(&path)) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No agent config at {}, using defaults", path);
            AgentConfig::default()
        }
        Err(e) => {
            tracing::warn!("Ignoring agent config at {}: {}", path, e);
            AgentConfig::default()
        }
    }
}

pub fn read_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
