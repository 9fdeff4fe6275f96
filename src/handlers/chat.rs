use crate::chat::{run_turn, ChatOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// POST /chat - Run one chat turn against an ingested session.
///
/// The session stays locked for the whole turn, so concurrent turns for the
/// same session run one after another.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>> {
    let handle = state
        .registry
        .get(&request.session_id)
        .ok_or_else(|| AppError::SessionNotFound(request.session_id.clone()))?;

    let start = Instant::now();
    let mut session = handle.lock().await;
    let outcome = run_turn(&mut session, &request.message, &state.turn_context()).await?;

    tracing::info!(
        session_id = %request.session_id,
        considered = outcome.tools_considered.len(),
        tool_called = outcome.tool_result.is_some(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Chat turn completed"
    );
    metrics::counter!("chat_turns_total").increment(1);

    Ok(Json(outcome))
}

/// DELETE /sessions/:session_id/history - Forget the conversation, keep the tools.
pub async fn clear_history_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode> {
    if state.registry.clear_history(&session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(session_id))
    }
}

/// DELETE /sessions/:session_id - Drop the session entirely.
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode> {
    if state.registry.remove(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(session_id))
    }
}
