//! Responses-protocol upstream client.
//!
//! Current-generation dialect: conversation continuity travels as a
//! `previous_response_id`, retrieval goes through the hosted `file_search`
//! tool bound to a fixed vector store, and streamed output arrives as
//! typed SSE events (`response.created`, `response.output_text.delta`,
//! `response.completed`, ...).

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::domain::relay::ConversationState;
use crate::ports::{GenerationRequest, LlmClient, LlmError, LlmStream, StreamEvent};

use super::sse::sse_event_stream;

/// Configuration for the responses-protocol client.
#[derive(Debug, Clone)]
pub struct ResponsesConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Identifier of the grounding vector store.
    pub vector_store_id: String,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Maximum retrieval matches per request.
    pub max_results: u32,
    /// Total request timeout; bounds stalled streams.
    pub timeout: Duration,
}

impl ResponsesConfig {
    /// Creates a configuration with the given credentials and corpus id.
    pub fn new(api_key: impl Into<String>, vector_store_id: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            vector_store_id: vector_store_id.into(),
            model: "gpt-4.1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_results: 20,
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the retrieval result cap.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Responses-protocol implementation of the `LlmClient` port.
pub struct ResponsesClient {
    config: ResponsesConfig,
    client: Client,
}

impl ResponsesClient {
    pub fn new(config: ResponsesConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url)
    }

    fn to_wire_request<'a>(&'a self, request: &'a GenerationRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.config.model,
            instructions: &request.instructions,
            input: &request.input,
            previous_response_id: request
                .state_token
                .as_ref()
                .map(ConversationState::as_str),
            store: true,
            temperature: 0.3,
            stream: true,
            tools: vec![FileSearchTool {
                kind: "file_search",
                vector_store_ids: vec![&self.config.vector_store_id],
                max_num_results: self.config.max_results,
            }],
        }
    }
}

#[async_trait]
impl LlmClient for ResponsesClient {
    async fn open_stream(&self, request: GenerationRequest) -> Result<LlmStream, LlmError> {
        let wire = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.responses_url())
            .bearer_auth(self.config.api_key())
            .json(&wire)
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "upstream rejected generation request");
            return Err(LlmError::status(status.as_u16(), error_summary(&body)));
        }

        let (events, cancel) = sse_event_stream(response.bytes_stream(), parse_event);
        Ok(LlmStream { events, cancel })
    }
}

/// Maps one responses-dialect SSE payload to an upstream event.
fn parse_event(data: &str) -> Option<StreamEvent> {
    let event: WireEvent = serde_json::from_str(data).ok()?;
    match event.kind.as_str() {
        "response.created" => event
            .response
            .and_then(|r| r.id)
            .map(|id| StreamEvent::StateCreated(ConversationState::new(id))),
        "response.output_text.delta" => event
            .delta
            .filter(|delta| !delta.is_empty())
            .map(StreamEvent::TextDelta),
        "response.completed" => Some(StreamEvent::Done),
        "response.failed" | "response.incomplete" => {
            let message = event
                .response
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "generation failed".to_string());
            Some(StreamEvent::UpstreamError(message))
        }
        "error" => Some(StreamEvent::UpstreamError(
            event
                .message
                .unwrap_or_else(|| "upstream error".to_string()),
        )),
        _ => None,
    }
}

fn classify_send_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else if e.is_connect() {
        LlmError::transport(format!("connection failed: {e}"))
    } else {
        LlmError::transport(e.to_string())
    }
}

/// Short human-readable summary of an upstream error body.
///
/// Prefers the `error.message` field of a JSON body; falls back to a
/// truncated slice so raw payloads never reach the caller verbatim.
pub(super) fn error_summary(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error detail".to_string();
    }
    trimmed.chars().take(200).collect()
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    store: bool,
    temperature: f32,
    stream: bool,
    tools: Vec<FileSearchTool<'a>>,
}

#[derive(Debug, Serialize)]
struct FileSearchTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    vector_store_ids: Vec<&'a str>,
    max_num_results: u32,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    response: Option<WireResponse>,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: Option<String>,
}
