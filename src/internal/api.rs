use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::internal::{
    agent::{Agent, Dispatch, TaskResult},
    mem::store::MemoryRecord,
    tools::{
        result::ToolResult,
        spec::{ToolArgs, ToolInfo},
    },
    trace::events::{AgentEvent, EventLog},
};

// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub events: EventLog,
}

impl AppState {
    /// `events` should be a sink already attached to `agent`.
    pub fn new(agent: Arc<Agent>, events: EventLog) -> Self {
        Self { agent, events }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/tools", get(list_tools))
        .route("/v1/tools/:name/execute", post(execute_tool))
        .route("/v1/run", post(run_task))
        .route("/v1/memory", get(list_memory))
        .route("/v1/memory/history", get(memory_history))
        .route("/v1/memory/:key", get(get_memory).delete(forget_memory))
        .route("/v1/events", get(list_events))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn not_found(message: String) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub args: ToolArgs,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RunRequest {
    pub task: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MemoryKeysResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MemoryValueResponse {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ForgetResponse {
    pub removed: bool,
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolInfo>> {
    Json(state.agent.tools().await)
}

async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ExecuteRequest>,
) -> (StatusCode, Json<ToolResult>) {
    // Unknown tools still answer with an envelope, just under a 404
    let (dispatch, result) = state.agent.dispatch_tool(&name, request.args).await;
    let status = match dispatch {
        Dispatch::Executed => StatusCode::OK,
        Dispatch::NotFound => StatusCode::NOT_FOUND,
    };
    (status, Json(result))
}

async fn run_task(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Json<TaskResult> {
    Json(state.agent.run(&request.task).await)
}

async fn list_memory(State(state): State<AppState>) -> Json<MemoryKeysResponse> {
    let keys = state.agent.memory().await.list_keys();
    Json(MemoryKeysResponse { keys })
}

async fn memory_history(State(state): State<AppState>) -> Json<Vec<MemoryRecord>> {
    Json(state.agent.memory().await.history())
}

async fn get_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MemoryValueResponse>, ApiError> {
    let value = state
        .agent
        .memory()
        .await
        .get(&key)
        .cloned()
        .ok_or_else(|| not_found(format!("Memory key '{}' not found", key)))?;

    Ok(Json(MemoryValueResponse { key, value }))
}

async fn forget_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ForgetResponse> {
    let removed = state.agent.forget(&key).await;
    Json(ForgetResponse { removed })
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<AgentEvent>> {
    Json(state.events.events())
}
