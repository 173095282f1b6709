//! Built-in tool tests: file, shell and HTTP

use axum::{http::header, routing::get, Json, Router};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tiny_agent::{
    last_result_key, Agent, FileTool, HttpTool, ShellTool, Tool, ToolArgs, ToolError,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        _ => panic!("args must be an object"),
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tiny-agent-{}-{}", Uuid::new_v4(), name))
}

async fn spawn_stub_server() -> (String, JoinHandle<()>) {
    async fn json_handler() -> Json<Value> {
        Json(json!({ "slideshow": { "title": "Sample" } }))
    }

    async fn text_handler() -> &'static str {
        "plain body"
    }

    async fn broken_json_handler() -> ([(header::HeaderName, &'static str); 1], &'static str) {
        ([(header::CONTENT_TYPE, "application/json")], "{not json")
    }

    let app = Router::new()
        .route("/json", get(json_handler))
        .route("/text", get(text_handler))
        .route("/broken-json", get(broken_json_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("stub server error");
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_file_read() {
    let path = temp_path("read.txt");
    std::fs::write(&path, "test content").unwrap();

    let result = FileTool
        .execute(args(json!({"action": "read", "filepath": path.to_str().unwrap()})))
        .await
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.data().unwrap()["content"], "test content");

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_file_write() {
    let path = temp_path("write.txt");
    let filepath = path.to_str().unwrap().to_string();

    let result = FileTool
        .execute(args(json!({
            "action": "write",
            "filepath": filepath,
            "content": "new content"
        })))
        .await
        .unwrap();
    assert!(result.is_success());
    assert_eq!(
        result.data().unwrap()["message"],
        format!("File written: {}", filepath)
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_file_exists() {
    let path = temp_path("exists.txt");
    std::fs::write(&path, "x").unwrap();

    let present = FileTool
        .execute(args(json!({"action": "exists", "filepath": path.to_str().unwrap()})))
        .await
        .unwrap();
    assert_eq!(present.data().unwrap()["exists"], true);

    std::fs::remove_file(&path).ok();
    let absent = FileTool
        .execute(args(json!({"action": "exists", "filepath": path.to_str().unwrap()})))
        .await
        .unwrap();
    assert_eq!(absent.data().unwrap()["exists"], false);
}

#[tokio::test]
async fn test_file_unknown_action() {
    let result = FileTool
        .execute(args(json!({"action": "chmod", "filepath": "/tmp/x"})))
        .await
        .unwrap();
    assert!(!result.is_success());
    assert_eq!(result.error(), Some("Unknown action: chmod"));
}

#[tokio::test]
async fn test_file_read_missing_is_failure_through_agent() {
    let agent = Agent::new("file-agent");
    agent.register_tool(Arc::new(FileTool)).await.unwrap();

    let path = temp_path("missing.txt");
    let result = agent
        .execute_tool(
            "file_operations",
            args(json!({"action": "read", "filepath": path.to_str().unwrap()})),
        )
        .await;
    assert!(!result.is_success());
    assert!(result.error().unwrap().starts_with("I/O error"));

    let stored = agent
        .memory()
        .await
        .get_or(&last_result_key("file_operations"), Value::Null);
    assert_eq!(stored["success"], false);
}

#[tokio::test]
async fn test_invalid_arguments_are_reported() {
    let err = FileTool
        .execute(args(json!({"action": 42})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn test_shell_success() {
    let result = ShellTool::new()
        .execute(args(json!({"command": "echo 'hello world'"})))
        .await
        .unwrap();
    assert!(result.is_success());
    assert!(result.data().unwrap()["stdout"]
        .as_str()
        .unwrap()
        .contains("hello world"));
    assert_eq!(result.data().unwrap()["returncode"], 0);
    assert!(result.metadata().contains_key("elapsed_ms"));
}

#[tokio::test]
async fn test_shell_error() {
    let result = ShellTool::new()
        .execute(args(json!({"command": "false"})))
        .await
        .unwrap();
    assert!(!result.is_success());
    assert_eq!(result.data().unwrap()["returncode"], 1);
    assert_eq!(result.error(), Some("Command exited with status 1"));
}

#[tokio::test]
async fn test_shell_exit_code_through_agent() {
    let agent = Agent::new("shell-agent");
    agent.register_tool(Arc::new(ShellTool::new())).await.unwrap();

    let result = agent
        .execute_tool("shell_command", args(json!({"command": "echo oops >&2; exit 3"})))
        .await;
    assert!(!result.is_success());
    let data = result.data().unwrap();
    assert_eq!(data["returncode"], 3);
    assert!(data["stderr"].as_str().unwrap().contains("oops"));

    let stored = agent
        .memory()
        .await
        .get_or(&last_result_key("shell_command"), Value::Null);
    assert_eq!(stored["data"]["returncode"], 3);
}

#[tokio::test]
async fn test_shell_timeout() {
    let started = std::time::Instant::now();
    let result = ShellTool::new()
        .execute(args(json!({"command": "sleep 5", "timeout": 1})))
        .await
        .unwrap();
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_shell_fractional_timeout() {
    let quick = ShellTool::new()
        .execute(args(json!({"command": "echo hi", "timeout": 0.5})))
        .await
        .unwrap();
    assert!(quick.is_success());
    assert!(quick.data().unwrap()["stdout"].as_str().unwrap().contains("hi"));

    let started = std::time::Instant::now();
    let slow = ShellTool::new()
        .execute(args(json!({"command": "sleep 2", "timeout": 0.5})))
        .await
        .unwrap();
    assert!(!slow.is_success());
    assert_eq!(slow.error(), Some("Command timed out after 0.5s"));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_shell_rejects_negative_timeout() {
    let err = ShellTool::new()
        .execute(args(json!({"command": "echo hi", "timeout": -1})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn test_shell_default_timeout_is_configurable() {
    let tool = ShellTool::with_timeout(Duration::from_secs(1));
    let result = tool
        .execute(args(json!({"command": "sleep 5"})))
        .await
        .unwrap();
    assert_eq!(result.error(), Some("Command timed out after 1s"));
}

#[tokio::test]
async fn test_http_get_json() {
    let (base_url, handle) = spawn_stub_server().await;

    let result = HttpTool::new()
        .execute(args(json!({"method": "get", "url": format!("{}/json", base_url)})))
        .await
        .unwrap();
    assert!(result.is_success());
    let data = result.data().unwrap();
    assert_eq!(data["status_code"], 200);
    assert_eq!(data["json"]["slideshow"]["title"], "Sample");
    assert!(data["headers"]["content-type"]
        .as_str()
        .unwrap()
        .starts_with("application/json"));

    handle.abort();
}

#[tokio::test]
async fn test_http_non_json_body() {
    let (base_url, handle) = spawn_stub_server().await;

    let result = HttpTool::new()
        .execute(args(json!({"url": format!("{}/text", base_url)})))
        .await
        .unwrap();
    let data = result.data().unwrap();
    assert_eq!(data["text"], "plain body");
    assert!(data["json"].is_null());

    handle.abort();
}

#[tokio::test]
async fn test_http_malformed_json_body_is_failure() {
    let (base_url, handle) = spawn_stub_server().await;
    let agent = Agent::new("http-agent");
    agent.register_tool(Arc::new(HttpTool::new())).await.unwrap();

    let result = agent
        .execute_tool(
            "http_request",
            args(json!({"url": format!("{}/broken-json", base_url)})),
        )
        .await;
    assert!(!result.is_success());
    assert!(result.data().is_none());
    assert!(result
        .error()
        .unwrap()
        .starts_with("HTTP error: Invalid JSON response body"));

    let stored = agent
        .memory()
        .await
        .get_or(&last_result_key("http_request"), Value::Null);
    assert_eq!(stored["success"], false);

    handle.abort();
}

#[tokio::test]
async fn test_http_invalid_url_through_agent() {
    let agent = Agent::new("http-agent");
    agent.register_tool(Arc::new(HttpTool::new())).await.unwrap();

    // Nothing listens on port 9 locally
    let result = agent
        .execute_tool("http_request", args(json!({"url": "http://127.0.0.1:9/"})))
        .await;
    assert!(!result.is_success());
    assert!(result.error().unwrap().starts_with("HTTP error"));
}

#[tokio::test]
async fn test_http_rejects_bad_method() {
    let err = HttpTool::new()
        .execute(args(json!({"method": "NOT A METHOD", "url": "http://127.0.0.1:9/"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}
