// Agent kernel library entry point

pub mod internal {
    pub mod tools {
        pub mod file;
        pub mod http;
        pub mod result;
        pub mod shell;
        pub mod spec;
    }
    pub mod mem {
        pub mod store;
    }
    pub mod trace {
        pub mod events;
    }
    pub mod agent;
    pub mod api;
    pub mod config;
    pub mod registry;
}

// Re-export key types for external use
pub use internal::agent::{
    last_result_key, Agent, Dispatch, TaskResult, TaskStatus, CURRENT_TASK_KEY,
};
pub use internal::config::{load_config, read_config, AgentConfig, ConfigError};
pub use internal::mem::store::{MemoryAction, MemoryRecord, MemoryStore};
pub use internal::registry::{RegistrationError, RegistryError, ToolRegistry};
pub use internal::tools::file::FileTool;
pub use internal::tools::http::HttpTool;
pub use internal::tools::result::{EnvelopeError, ToolResult};
pub use internal::tools::shell::ShellTool;
pub use internal::tools::spec::{Tool, ToolArgs, ToolError, ToolInfo};
pub use internal::trace::events::{
    AgentEvent, EventKind, EventLog, EventSink, TracingSink, DEFAULT_EVENT_CAPACITY,
};
