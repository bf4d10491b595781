//! HTTP DTOs for the chat relay endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::relay::{ChatRequest, ConversationState, Language, RequestError};

/// Inbound body for `POST /api/chat`.
///
/// `message` is optional at the DTO level so that a missing field reaches
/// validation (and its 400 contract) instead of dying in body extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestDto {
    /// User message text.
    pub message: Option<String>,
    /// Token from a previous turn, forwarded unchanged.
    pub state_token: Option<String>,
    /// Interface language ("fr" or "en").
    #[serde(default)]
    pub language: Language,
}

impl ChatRequestDto {
    /// Validates the DTO into a domain request.
    pub fn into_request(self) -> Result<ChatRequest, RequestError> {
        ChatRequest::new(
            self.message.unwrap_or_default(),
            self.state_token.map(ConversationState::new),
            self.language,
        )
    }
}

/// Structured JSON error body for non-streamed failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
