use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::internal::{
    config::AgentConfig,
    tools::{
        file::FileTool,
        http::HttpTool,
        shell::ShellTool,
        spec::{Tool, ToolInfo},
    },
};

/// Short names accepted on the command line and in config, in listing order.
pub const DEFAULT_TOOL_NAMES: &[&str] = &["http", "file", "shell"];

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Tool does not implement the tool contract: name is empty")]
    EmptyName,
    #[error("Tool '{0}' does not implement the tool contract: description is empty")]
    EmptyDescription(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Built-in tools keyed by short name.
pub fn default_tools(config: &AgentConfig) -> HashMap<String, Arc<dyn Tool>> {
    let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();
    tools.insert(
        "http".to_string(),
        Arc::new(HttpTool::with_timeout(config.http_timeout())),
    );
    tools.insert("file".to_string(), Arc::new(FileTool));
    tools.insert(
        "shell".to_string(),
        Arc::new(ShellTool::with_timeout(config.shell_timeout())),
    );
    tools
}

/// Picks built-in tools by short name; every built-in when `names` is `None`.
pub fn select_tools(
    names: Option<&[String]>,
    config: &AgentConfig,
) -> Result<Vec<Arc<dyn Tool>>, RegistryError> {
    let mut available = default_tools(config);
    match names {
        None => Ok(DEFAULT_TOOL_NAMES
            .iter()
            .filter_map(|name| available.remove(*name))
            .collect()),
        Some(names) => names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| {
                available
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
            })
            .collect(),
    }
}

/// Split a comma-separated list such as `"http, shell"`.
pub fn parse_tool_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Check that a tool satisfies the contract before it may be registered.
pub fn validate_tool(tool: &dyn Tool) -> Result<(), RegistrationError> {
    if tool.name().trim().is_empty() {
        return Err(RegistrationError::EmptyName);
    }
    if tool.description().trim().is_empty() {
        return Err(RegistrationError::EmptyDescription(tool.name().to_string()));
    }
    Ok(())
}

/// Name to tool map shared behind a lock. Tools are held by `Arc`, so the
/// same instance can be registered with several agents.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tool`, replacing any tool already registered under its name.
    /// Returns the replaced tool.
    pub async fn register(
        &self,
        tool: Arc<dyn Tool>,
    ) -> Result<Option<Arc<dyn Tool>>, RegistrationError> {
        validate_tool(tool.as_ref())?;
        let name = tool.name().to_string();
        Ok(self.inner.write().await.insert(name, tool))
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.inner.read().await.get(name).cloned()
    }

    /// Registered names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn list(&self) -> Vec<ToolInfo> {
        let mut infos: Vec<ToolInfo> = self
            .inner
            .read()
            .await
            .values()
            .map(|tool| ToolInfo::of(tool.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_list() {
        assert_eq!(parse_tool_list(" http, ,shell "), vec!["http", "shell"]);
        assert!(parse_tool_list("").is_empty());
    }

    #[test]
    fn test_select_tools_rejects_unknown_name() {
        let config = AgentConfig::default();
        let names = vec!["http".to_string(), "ftp".to_string()];
        let err = select_tools(Some(names.as_slice()), &config).err().unwrap();
        assert_eq!(err.to_string(), "Unknown tool: ftp");
    }

    #[test]
    fn test_select_all_tools_in_listing_order() {
        let config = AgentConfig::default();
        let tools = select_tools(None, &config).unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["http_request", "file_operations", "shell_command"]);
    }
}
