//! HTTP handlers for the chat relay endpoint.
//!
//! One inbound POST becomes one relay session: validate the body, open
//! the upstream stream, then push frames over SSE until the terminal
//! sentinel. Failures before the first frame are answered as plain JSON;
//! once the push channel is open, every failure travels inside it.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tracing::{info, warn};

use crate::application::RelaySession;
use crate::domain::relay::RequestError;
use crate::ports::{LlmClient, LlmError};

use super::dto::{ChatRequestDto, ErrorResponse};

/// Shared state for the chat endpoint.
///
/// Built once at startup and cloned per request; sessions share nothing
/// else.
#[derive(Clone)]
pub struct ChatAppState {
    /// Upstream client, absent when credentials are not configured.
    client: Option<Arc<dyn LlmClient>>,
    /// Fixed instructions given to the model on every request.
    instructions: &'static str,
}

impl ChatAppState {
    pub fn new(client: Option<Arc<dyn LlmClient>>, instructions: &'static str) -> Self {
        Self {
            client,
            instructions,
        }
    }
}

/// POST /api/chat - relay one user message as an SSE answer stream.
///
/// # Errors
/// - 400 Bad Request: empty or malformed message
/// - 500 Internal Server Error: upstream not configured, or the upstream
///   rejected the request before any frame was written
pub async fn relay_chat(
    State(state): State<ChatAppState>,
    body: Result<Json<ChatRequestDto>, JsonRejection>,
) -> Result<Response, ChatApiError> {
    let Json(body) = body?;
    let request = body.into_request()?;

    let client = state.client.clone().ok_or(ChatApiError::Configuration)?;

    info!(
        continuing = request.state_token().is_some(),
        language = ?request.language(),
        "chat relay request"
    );

    let session = RelaySession::new(client, state.instructions);
    let frames = session.open(request).await?;

    let events =
        frames.map(|frame| Ok::<Event, Infallible>(Event::default().data(frame.payload())));

    let sse = Sse::new(events).keep_alive(KeepAlive::default());
    Ok(([(header::CACHE_CONTROL, "no-cache")], sse).into_response())
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Errors answered before any frame is written.
#[derive(Debug)]
pub enum ChatApiError {
    /// Request body failed validation.
    BadRequest(String),
    /// Upstream credentials or corpus id are not configured.
    Configuration,
    /// Upstream rejected or dropped the request before streaming began.
    Upstream(String),
}

impl From<JsonRejection> for ChatApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<RequestError> for ChatApiError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<LlmError> for ChatApiError {
    fn from(err: LlmError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ChatApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ChatApiError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upstream service is not configured".to_string(),
            ),
            ChatApiError::Upstream(message) => {
                warn!(error = %message, "relay failed before streaming");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
