//! Inbound relay request types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Opaque token marking where the upstream conversation left off.
///
/// Created by the upstream service on the first turn and stored by the
/// caller; the relay forwards it byte-for-byte and never inspects or
/// mutates its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState(String);

impl ConversationState {
    /// Wraps a token received from the caller or the upstream.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Interface language selected by the caller.
///
/// The upstream accepts only a flat text input next to the fixed
/// instructions, so the preference travels as a directive prepended to the
/// user text rather than as a structural field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Directive pinning the answer language regardless of the question's.
    pub fn directive(&self) -> &'static str {
        match self {
            Language::Fr => {
                "[IMPORTANT: Réponds UNIQUEMENT en français, même si la question est en anglais] "
            }
            Language::En => {
                "[IMPORTANT: Answer ONLY in English, even if the question is in French] "
            }
        }
    }
}

/// A validated relay request: one user message plus optional continuity.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    message: String,
    state_token: Option<ConversationState>,
    language: Language,
}

impl ChatRequest {
    /// Validates and builds a request.
    ///
    /// The message must contain at least one non-whitespace character;
    /// rejection happens here, before any upstream call is made.
    pub fn new(
        message: impl Into<String>,
        state_token: Option<ConversationState>,
        language: Language,
    ) -> Result<Self, RequestError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(RequestError::EmptyMessage);
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(RequestError::MessageTooLong);
        }
        Ok(Self {
            message,
            state_token,
            language,
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Token of the conversation to continue, if this is not a first turn.
    pub fn state_token(&self) -> Option<&ConversationState> {
        self.state_token.as_ref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// User text with the language directive prepended.
    pub fn directed_message(&self) -> String {
        format!("{}{}", self.language.directive(), self.message)
    }
}

/// Request validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Message exceeds maximum length")]
    MessageTooLong,
}
