//! One chat turn: rank tools, let the model pick one, call it, and answer.

use crate::error::{AppError, Result};
use crate::ingestion::Tool;
use crate::invocation::{ToolExecutor, ToolResult};
use crate::llm::{ChatMessage, ChatModel, FunctionDescriptor};
use crate::selection::{rank, RankPolicy};
use crate::session::SessionState;
use serde::Serialize;
use std::time::Instant;

/// Appended to the session instructions in every system prompt.
pub const STEERING_RULES: &str = "Do not use any upload, image, file, or multipart endpoints unless the user explicitly asks. \
Prefer create endpoints for add/make/new; prefer GET for find/list/get; prefer update for edit/modify; prefer delete for remove.";

/// Collaborators and knobs for a chat turn.
pub struct TurnContext<'a> {
    pub model: &'a dyn ChatModel,
    pub executor: &'a dyn ToolExecutor,
    pub tool_limit: usize,
    pub policy: RankPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
    pub tools_considered: Vec<String>,
}

/// Run one turn against a locked session.
///
/// The caller holds the session lock for the whole turn. Only the first tool
/// call of the model's reply is executed. A tool name outside the offered
/// shortlist fails the turn; everything that goes wrong inside the tool call
/// itself comes back in `tool_result`.
pub async fn run_turn(session: &mut SessionState, message: &str, ctx: &TurnContext<'_>) -> Result<ChatOutcome> {
    if message.trim().is_empty() {
        return Err(AppError::ValidationError("Message cannot be empty".to_string()));
    }

    let start = Instant::now();
    let shortlist: Vec<Tool> = rank(
        message,
        &session.tools,
        ctx.tool_limit,
        &session.vocabulary,
        ctx.policy,
    )
    .into_iter()
    .cloned()
    .collect();
    let tools_considered: Vec<String> = shortlist.iter().map(|t| t.name.clone()).collect();
    let descriptors: Vec<FunctionDescriptor> = shortlist.iter().map(FunctionDescriptor::from).collect();
    metrics::histogram!("rank_latency_us").record(start.elapsed().as_micros() as f64);

    let mut messages = Vec::with_capacity(session.history_len() + 4);
    messages.push(ChatMessage::System(format!(
        "{}\n{}",
        session.system_instructions(),
        STEERING_RULES
    )));
    messages.extend(session.history().cloned());
    messages.push(ChatMessage::User(message.to_string()));
    session.push_history(ChatMessage::User(message.to_string()));

    let reply = ctx.model.complete(&messages, &descriptors).await?;

    let Some(call) = reply.tool_calls.first() else {
        let answer = reply.content.unwrap_or_default();
        session.push_history(ChatMessage::assistant(answer.clone()));
        return Ok(ChatOutcome {
            answer,
            tool_result: None,
            tools_considered,
        });
    };

    let tool = shortlist
        .iter()
        .find(|t| t.name == call.name)
        .ok_or_else(|| AppError::UnknownTool(call.name.clone()))?;
    let arguments = call.parsed_arguments()?;

    tracing::info!(tool = %tool.name, method = %tool.method, path = %tool.path, "Model selected tool");
    let result = ctx.executor.execute(tool, &arguments).await;

    messages.push(ChatMessage::Assistant {
        content: None,
        tool_calls: vec![call.clone()],
    });
    messages.push(ChatMessage::Tool {
        tool_call_id: call.id.clone(),
        content: result.to_content(),
    });

    let final_reply = ctx.model.complete(&messages, &[]).await?;
    let answer = final_reply.content.unwrap_or_default();
    session.push_history(ChatMessage::assistant(answer.clone()));

    Ok(ChatOutcome {
        answer,
        tool_result: Some(result),
        tools_considered,
    })
}
