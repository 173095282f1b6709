use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::internal::tools::{
    result::ToolResult,
    spec::{parse_args, Tool, ToolArgs, ToolError},
};

pub const HTTP_TOOL_NAME: &str = "http_request";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct HttpArgs {
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    params: HashMap<String, String>,
    json: Option<Value>,
    body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Makes HTTP requests to web APIs.
#[derive(Debug, Clone)]
pub struct HttpTool {
    client: reqwest::Client,
}

impl HttpTool {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        // Builder only fails when the TLS backend cannot initialise
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { client }
    }
}

impl Default for HttpTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HttpTool {
    fn name(&self) -> &str {
        HTTP_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Make HTTP requests to web APIs"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolResult, ToolError> {
        let args: HttpArgs = parse_args(args)?;
        let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
            .map_err(|_| ToolError::InvalidArguments(format!("Invalid method: {}", args.method)))?;

        let mut request = self.client.request(method, &args.url);
        for (name, value) in &args.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !args.params.is_empty() {
            request = request.query(&args.params);
        }
        if let Some(body) = args.json {
            request = request.json(&body);
        } else if let Some(body) = args.body {
            request = request.body(body);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status_code = response.status().as_u16();
        let headers: Map<String, Value> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
                )
            })
            .collect();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        let text = response
            .text()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;
        let parsed = if is_json {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| ToolError::Http(format!("Invalid JSON response body: {}", e)))?
        } else {
            Value::Null
        };

        tracing::debug!("HTTP {} {} -> {}", args.method, args.url, status_code);

        Ok(ToolResult::success(json!({
            "status_code": status_code,
            "headers": headers,
            "text": text,
            "json": parsed,
        }))
        .with_metadata("elapsed_ms", json!(started.elapsed().as_millis() as u64)))
    }
}
