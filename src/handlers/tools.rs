use crate::error::{AppError, Result};
use crate::ingestion::HttpMethod;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ToolsQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub method: HttpMethod,
    pub path: String,
    pub base: String,
}

/// GET /tools?session_id= - List the tools ingested into a session.
///
/// Reads the published snapshot, so it answers while a chat turn holds the session.
pub async fn tools_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ToolsQuery>,
) -> Result<Json<Vec<ToolInfo>>> {
    let handle = state
        .registry
        .get(&query.session_id)
        .ok_or_else(|| AppError::SessionNotFound(query.session_id.clone()))?;
    let tools = handle
        .tools()
        .iter()
        .map(|tool| ToolInfo {
            name: tool.name.clone(),
            description: tool.description.clone(),
            method: tool.method,
            path: tool.path.clone(),
            base: tool.base_url.clone(),
        })
        .collect();

    Ok(Json(tools))
}
