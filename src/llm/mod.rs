//! The language-model contract.
//!
//! Ranked tools are offered to a chat model as function descriptors; the model
//! answers with text or with a call to one of them. Only this request/response
//! shape is fixed here; [`openai`] provides an OpenAI-compatible client.

pub mod openai;

use crate::error::{AppError, Result};
use crate::ingestion::Tool;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub use openai::OpenAiChatModel;

/// A tool as offered to the model: `{name, description, parameters}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionDescriptor {
    /// `{"type": "function", "function": {...}}` as used by chat completions.
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

impl From<&Tool> for FunctionDescriptor {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.to_value(),
        }
    }
}

/// A function call requested by the model. `arguments` is raw JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    /// Arguments as a JSON object; empty text means no arguments.
    pub fn parsed_arguments(&self) -> Result<Map<String, Value>> {
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(Value::Null) => Ok(Map::new()),
            Ok(other) => Err(AppError::ModelError(format!(
                "Tool arguments for {} are not an object: {}",
                self.name, other
            ))),
            Err(e) => Err(AppError::ModelError(format!(
                "Tool arguments for {} are not valid JSON: {}",
                self.name, e
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::System(content) | Self::User(content) => Some(content.as_str()),
            Self::Assistant { content, .. } => content.as_deref(),
            Self::Tool { content, .. } => Some(content.as_str()),
        }
    }

    pub fn to_openai(&self) -> Value {
        match self {
            Self::System(content) | Self::User(content) => {
                json!({ "role": self.role(), "content": content })
            }
            Self::Assistant {
                content,
                tool_calls,
            } => {
                let mut message = json!({ "role": "assistant", "content": content });
                if !tool_calls.is_empty() {
                    message["tool_calls"] = tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": { "name": call.name, "arguments": call.arguments },
                            })
                        })
                        .collect();
                }
                message
            }
            Self::Tool {
                tool_call_id,
                content,
            } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
        }
    }
}

/// What the model said back: text, tool calls, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// One chat completion. An empty `tools` slice means no tools are offered.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[FunctionDescriptor],
    ) -> Result<AssistantReply>;
}
