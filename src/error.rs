use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Failed to fetch specification: {0}")]
    FetchError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("No session: {0}")]
    SessionNotFound(String),

    #[error("Model selected a tool that was not offered: {0}")]
    UnknownTool(String),

    #[error("Language model call failed: {0}")]
    ModelError(String),

    #[error("Service temporarily unavailable: {0}")]
    ResourceError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::FetchError(e) => {
                tracing::warn!(error = %e, "Specification fetch error");
                StatusCode::BAD_GATEWAY
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                StatusCode::BAD_REQUEST
            }
            AppError::SessionNotFound(id) => {
                tracing::debug!(session_id = %id, "Session not found");
                StatusCode::NOT_FOUND
            }
            AppError::UnknownTool(name) => {
                tracing::error!(tool = %name, "Model returned a tool outside the shortlist");
                StatusCode::BAD_GATEWAY
            }
            AppError::ModelError(e) => {
                tracing::error!(error = %e, "Language model error");
                StatusCode::BAD_GATEWAY
            }
            AppError::ResourceError(msg) => {
                tracing::warn!(error = %msg, "Resource error");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
