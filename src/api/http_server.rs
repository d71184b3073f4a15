// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! axum server for the chat interface.
//!
//! Routes:
//! - `GET /` — embedded single-page chat UI
//! - `POST /v1/chat` — one question, one answer
//! - `GET /health` — liveness probe
//!
//! Each request runs its own pipeline pass; the shared state is immutable
//! handles behind `Arc`, so concurrent sessions need no locking here.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::RagError;
use crate::pipeline::AnswerPipeline;

const CHAT_PAGE: &str = include_str!("chat.html");

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<AnswerPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<AnswerPipeline>) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub context_found: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("chat interface listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<axum::Json<ChatResponse>, ApiErrorResponse> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error_code: "EMPTY_QUESTION",
            message: "Question must not be empty".to_string(),
        });
    }

    let answer = state.pipeline.ask(question).await.map_err(|e| {
        error!(error_code = e.error_code(), error = %e, "pipeline failed");
        ApiErrorResponse::from(e)
    })?;

    Ok(axum::Json(ChatResponse {
        answer: answer.text,
        context_found: answer.context_found,
    }))
}

/// JSON error body with the stable error code and a user-safe message.
struct ApiErrorResponse {
    status: StatusCode,
    error_code: &'static str,
    message: String,
}

impl From<RagError> for ApiErrorResponse {
    fn from(err: RagError) -> Self {
        let status = match &err {
            RagError::Generation { .. } | RagError::Connectivity { .. } => StatusCode::BAD_GATEWAY,
            RagError::Embedding(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error_code: err.error_code(),
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "error_code": self.error_code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
