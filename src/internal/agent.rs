use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use uuid::Uuid;

use crate::internal::{
    mem::store::MemoryStore,
    registry::{RegistrationError, ToolRegistry},
    tools::{
        result::ToolResult,
        spec::{Tool, ToolArgs, ToolInfo},
    },
    trace::events::{AgentEvent, EventKind, EventSink, TracingSink},
};

pub const CURRENT_TASK_KEY: &str = "current_task";

/// Memory slot holding the most recent envelope produced by `tool`.
pub fn last_result_key(tool: &str) -> String {
    format!("tool_{}_last_result", tool)
}

/// Whether an execution request reached a registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Executed,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: String,
    pub status: TaskStatus,
    pub tools_available: Vec<String>,
    pub memory_keys: Vec<String>,
}

/// Owns a tool registry and a memory store, and runs tools on behalf of a
/// caller. Every tool outcome, including faults, is returned as a
/// [`ToolResult`] and written to memory; unknown tool names are not.
pub struct Agent {
    id: Uuid,
    name: String,
    tools: ToolRegistry,
    memory: RwLock<MemoryStore>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tools: ToolRegistry::new(),
            memory: RwLock::new(MemoryStore::new()),
            sinks: vec![Arc::new(TracingSink)],
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, event: AgentEvent) {
        for sink in &self.sinks {
            sink.record(&event);
        }
    }

    fn event(&self, kind: EventKind) -> AgentEvent {
        AgentEvent::new(self.id, &self.name, kind)
    }

    pub async fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<(), RegistrationError> {
        let name = tool.name().to_string();
        if let Some(previous) = self.tools.register(tool).await? {
            tracing::debug!("Replaced previously registered tool: {}", previous.name());
        }
        self.emit(self.event(EventKind::ToolRegistered).with_tool(&name));
        Ok(())
    }

    pub async fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).await
    }

    pub async fn tool_names(&self) -> Vec<String> {
        self.tools.names().await
    }

    pub async fn tools(&self) -> Vec<ToolInfo> {
        self.tools.list().await
    }

    pub async fn execute_tool(&self, name: &str, args: ToolArgs) -> ToolResult {
        self.dispatch_tool(name, args).await.1
    }

    /// Like [`Agent::execute_tool`], but also says whether `name` resolved to a
    /// tool. Both come from the same registry lookup.
    pub async fn dispatch_tool(&self, name: &str, args: ToolArgs) -> (Dispatch, ToolResult) {
        // Clone the handle out so the registry lock is not held across the call
        let Some(tool) = self.tools.get(name).await else {
            self.emit(self.event(EventKind::ToolNotFound).with_tool(name));
            let result = ToolResult::failure(format!("Tool '{}' not found", name));
            return (Dispatch::NotFound, result);
        };

        self.emit(self.event(EventKind::ToolExecuting).with_tool(name));
        let result = ToolResult::from_outcome(tool.execute(args).await);

        self.memory
            .write()
            .await
            .set(last_result_key(name), result.to_value());

        let kind = if result.is_success() {
            EventKind::ToolSucceeded
        } else {
            EventKind::ToolFailed
        };
        let mut event = self.event(kind).with_tool(name);
        if let Some(error) = result.error() {
            event = event.with_detail(json!({ "error": error }));
        }
        self.emit(event);

        (Dispatch::Executed, result)
    }

    /// Record `task` and report what the agent has available. Always completes.
    pub async fn run(&self, task: &str) -> TaskResult {
        self.emit(
            self.event(EventKind::TaskStarted)
                .with_detail(json!({ "task": task })),
        );

        let memory_keys = {
            let mut memory = self.memory.write().await;
            memory.set(CURRENT_TASK_KEY, Value::String(task.to_string()));
            memory.list_keys()
        };

        TaskResult {
            task: task.to_string(),
            status: TaskStatus::Completed,
            tools_available: self.tools.names().await,
            memory_keys,
        }
    }

    /// Read-only view of the agent's memory.
    pub async fn memory(&self) -> RwLockReadGuard<'_, MemoryStore> {
        self.memory.read().await
    }

    /// Delete `key` from memory. Returns false if it was not present.
    pub async fn forget(&self, key: &str) -> bool {
        self.memory.write().await.delete(key)
    }
}
