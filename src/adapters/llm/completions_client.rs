//! Legacy chat-completions upstream client.
//!
//! First-generation dialect kept for deployments without a provisioned
//! vector store: no conversation state token, no retrieval tool, deltas
//! under `choices[0].delta.content` and a literal `[DONE]` sentinel. The
//! relay session is identical; only this adapter differs.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::ports::{GenerationRequest, LlmClient, LlmError, LlmStream, StreamEvent};

use super::responses_client::error_summary;
use super::sse::sse_event_stream;

/// Configuration for the legacy chat-completions client.
#[derive(Debug, Clone)]
pub struct CompletionsConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Total request timeout; bounds stalled streams.
    pub timeout: Duration,
}

impl CompletionsConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
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

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Chat-completions implementation of the `LlmClient` port.
pub struct CompletionsClient {
    config: CompletionsConfig,
    client: Client,
}

impl CompletionsClient {
    pub fn new(config: CompletionsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request<'a>(&'a self, request: &'a GenerationRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.config.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.instructions,
                },
                WireMessage {
                    role: "user",
                    content: &request.input,
                },
            ],
            temperature: 0.7,
            max_tokens: 1500,
            stream: true,
        }
    }
}

#[async_trait]
impl LlmClient for CompletionsClient {
    async fn open_stream(&self, request: GenerationRequest) -> Result<LlmStream, LlmError> {
        if request.state_token.is_some() {
            // This dialect has no continuity token; the turn still works,
            // it just starts from a blank upstream context.
            warn!("state token ignored by the completions protocol");
        }

        let wire = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
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

/// Maps one completions-dialect SSE payload to an upstream event.
fn parse_event(data: &str) -> Option<StreamEvent> {
    if data == "[DONE]" {
        return Some(StreamEvent::Done);
    }

    let chunk: WireChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(StreamEvent::TextDelta)
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

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    delta: WireDelta,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}
