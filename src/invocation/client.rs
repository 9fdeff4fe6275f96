//! Calls the downstream API behind a tool.
//!
//! Every outcome, including a missing path parameter, a non-2xx status, a
//! non-JSON body or a transport failure, is returned as a [`ToolResult`] so it
//! can be handed back to the model as the tool's output.

use crate::error::{AppError, Result};
use crate::ingestion::{HttpMethod, Tool};
use crate::invocation::materialize::materialize;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::{Duration, Instant};

/// Normalized result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub status_code: u16,

    /// Parsed JSON response, or `{"text": raw}` when the body is not JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub url: String,
}

impl ToolResult {
    pub fn failure(status: StatusCode, error: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            error: Some(error.into()),
            url: url.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// JSON text handed to the model as the tool message content.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| json!({ "status_code": self.status_code }).to_string())
    }
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool: &Tool, arguments: &Map<String, Value>) -> ToolResult;
}

/// `reqwest`-backed executor with a bounded per-call timeout. No retries.
#[derive(Clone)]
pub struct HttpToolInvoker {
    http: reqwest::Client,
}

impl HttpToolInvoker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ResourceError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl ToolExecutor for HttpToolInvoker {
    async fn execute(&self, tool: &Tool, arguments: &Map<String, Value>) -> ToolResult {
        let result = self.send(tool, arguments).await;
        metrics::counter!("tool_invocations_total", "status" => result.status_code.to_string())
            .increment(1);
        result
    }
}

impl HttpToolInvoker {
    async fn send(&self, tool: &Tool, arguments: &Map<String, Value>) -> ToolResult {
        let call = match materialize(tool, arguments) {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!(tool = %tool.name, error = %e, "Tool call could not be built");
                return ToolResult::failure(
                    StatusCode::BAD_REQUEST,
                    e.to_string(),
                    format!("{}{}", tool.base_url, tool.path),
                );
            }
        };

        let url = join_url(&tool.base_url, &call.path);
        let method = match tool.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .http
            .request(method, &url)
            .header("accept", "application/json")
            .query(&call.query_pairs());
        if tool.method.sends_body() {
            if let Some(body) = &call.body {
                request = request.json(body);
            }
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(tool, url, e),
        };

        // The client timeout also covers reading the body.
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return transport_failure(tool, url, e),
        };
        let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));

        tracing::info!(
            tool = %tool.name,
            method = %tool.method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tool call completed"
        );

        ToolResult {
            status_code: status.as_u16(),
            data: Some(data),
            error: None,
            url,
        }
    }
}

/// 504 for a timeout, 502 for any other transport error.
fn transport_failure(tool: &Tool, url: String, error: reqwest::Error) -> ToolResult {
    let status = if error.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    tracing::warn!(tool = %tool.name, url = %url, error = %error, "Tool call failed");
    ToolResult::failure(status, error.to_string(), url)
}

/// `base` and `path` joined with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
