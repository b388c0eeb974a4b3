use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use crate::config::Config;
use crate::cors::cors_layer;
use crate::error::ApiError;
use crate::upstream::{OllamaClient, UpstreamReply};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: OllamaClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let upstream = OllamaClient::new(&config.ollama_url, config.upstream_timeout)?;
        Ok(AppState {
            config: Arc::new(config),
            upstream,
        })
    }
}

pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/tags", get(tags))
        .route("/api/chat", post(chat))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    ollama: String,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        ollama: state.upstream.base_url().to_string(),
    })
}

async fn tags(State(state): State<AppState>) -> Result<Response, ApiError> {
    let reply = state.upstream.tags().await.map_err(ApiError::Tags)?;
    Ok(relay(reply))
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let reply = state.upstream.chat(body).await.map_err(ApiError::Chat)?;
    Ok(relay(reply))
}

fn relay(reply: UpstreamReply) -> Response {
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "Not found" }))).into_response()
}
