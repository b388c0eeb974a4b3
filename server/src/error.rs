use crate::upstream::UpstreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub const UPSTREAM_FAILURE: &str = "Failed to connect to Ollama";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Error proxying /api/tags: {0}")]
    Tags(#[source] UpstreamError),

    #[error("Error proxying /api/chat: {0}")]
    Chat(#[source] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Tags(cause) => {
                error!(route = "/api/tags", kind = cause.kind(), detail = %cause.detail(), "{}", self);
                serde_json::json!({ "error": UPSTREAM_FAILURE })
            }
            ApiError::Chat(cause) => {
                error!(route = "/api/chat", kind = cause.kind(), detail = %cause.detail(), "{}", self);
                serde_json::json!({ "error": UPSTREAM_FAILURE, "message": cause.detail() })
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
