//! OpenAI-compatible chat completions client.

use crate::error::{AppError, Result};
use crate::llm::{AssistantReply, ChatMessage, ChatModel, FunctionDescriptor, ToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Works with any provider exposing `POST /v1/chat/completions` with bearer auth.
#[derive(Clone)]
pub struct OpenAiChatModel {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(
        base_url: &str,
        api_path: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ResourceError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                api_path.trim_start_matches('/')
            ),
            api_key,
            model: model.into(),
        })
    }

    fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::ModelError("OPENAI_API_KEY is not set".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[FunctionDescriptor],
    ) -> Result<AssistantReply> {
        let api_key = self.require_api_key()?;

        let payload = CompletionRequest {
            model: &self.model,
            messages: messages.iter().map(ChatMessage::to_openai).collect(),
            tools: (!tools.is_empty()).then(|| tools.iter().map(FunctionDescriptor::to_openai).collect()),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let response: CompletionResponse = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ModelError(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::ModelError(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::ModelError(e.to_string()))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| AppError::ModelError("Response has no message".to_string()))?;

        Ok(AssistantReply {
            content: message.content,
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments.unwrap_or_default(),
                })
                .collect(),
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: Option<String>,
}
