use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ToolRegistered,
    ToolExecuting,
    ToolSucceeded,
    ToolFailed,
    ToolNotFound,
    TaskStarted,
}

/// Something observable the agent did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    pub agent_id: Uuid,
    pub agent: String,
    pub ts: DateTime<Utc>,
    pub kind: EventKind,
    pub tool: Option<String>,
    pub detail: Option<Value>,
}

impl AgentEvent {
    pub fn new(agent_id: Uuid, agent: &str, kind: EventKind) -> Self {
        Self {
            agent_id,
            agent: agent.to_string(),
            ts: Utc::now(),
            kind,
            tool: None,
            detail: None,
        }
    }

    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tool = Some(tool.to_string());
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Receives every event the agent emits.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &AgentEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &AgentEvent) {
        let tool = event.tool.as_deref().unwrap_or("-");
        match event.kind {
            EventKind::ToolRegistered => {
                tracing::info!(agent = %event.agent, "Registered tool: {}", tool)
            }
            EventKind::ToolExecuting => {
                tracing::info!(agent = %event.agent, "Executing tool: {}", tool)
            }
            EventKind::ToolSucceeded => {
                tracing::debug!(agent = %event.agent, "Tool {} succeeded", tool)
            }
            EventKind::ToolFailed => tracing::warn!(
                agent = %event.agent,
                "Error executing tool {}: {}",
                tool,
                error_detail(event)
            ),
            EventKind::ToolNotFound => {
                tracing::warn!(agent = %event.agent, "Tool '{}' not found", tool)
            }
            EventKind::TaskStarted => tracing::info!(
                agent = %event.agent,
                "Starting task: {}",
                event
                    .detail
                    .as_ref()
                    .and_then(|d| d.get("task"))
                    .and_then(|t| t.as_str())
                    .unwrap_or("")
            ),
        }
    }
}

fn error_detail(event: &AgentEvent) -> &str {
    event
        .detail
        .as_ref()
        .and_then(|d| d.get("error"))
        .and_then(|e| e.as_str())
        .unwrap_or("unknown error")
}

/// Events kept by [`EventLog::new`] before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Keeps the most recent events in memory, in emission order. Clones share
/// the same log.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Arc<Mutex<VecDeque<AgentEvent>>>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// A capacity of zero keeps nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn record(&self, event: &AgentEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
