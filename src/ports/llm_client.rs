//! Upstream LLM client port.
//!
//! Abstracts the external inference service behind a cancellable, ordered
//! stream of events so the relay session never couples to a concrete wire
//! protocol. One adapter exists per upstream protocol generation; all of
//! them share the single session loop in `application::session`.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::relay::ConversationState;

/// Port for streamed generation against an upstream LLM service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Starts (or continues) a generation and returns its event stream.
    ///
    /// An `Err` here means the request failed before any event was
    /// produced; failures after the stream is open arrive in-band as
    /// [`StreamEvent::UpstreamError`].
    async fn open_stream(&self, request: GenerationRequest) -> Result<LlmStream, LlmError>;
}

/// Inputs for one streamed generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fixed behavioral instructions for the model.
    pub instructions: String,
    /// User input, already carrying the language directive.
    pub input: String,
    /// Token of the conversation to continue, absent on a first turn.
    pub state_token: Option<ConversationState>,
}

/// One upstream event, delivered in strict arrival order.
///
/// `Done` and `UpstreamError` are terminal: no event is valid after
/// either. At most one `StateCreated` is expected per stream, near the
/// start, but extras are tolerated by the session and forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The upstream created new conversation state.
    StateCreated(ConversationState),
    /// Incremental answer text.
    TextDelta(String),
    /// Generation finished.
    Done,
    /// Generation failed after the stream opened.
    UpstreamError(String),
}

/// An open generation: the ordered event stream plus its cancel handle.
pub struct LlmStream {
    pub events: EventStream,
    pub cancel: Arc<dyn CancelHandle>,
}

impl std::fmt::Debug for LlmStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmStream").finish_non_exhaustive()
    }
}

/// Boxed ordered stream of upstream events.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Best-effort, fire-and-forget abort of an in-flight generation.
///
/// Cancelling only guarantees that local consumption stops and no further
/// events are delivered; the upstream may keep producing tokens that are
/// never read.
pub trait CancelHandle: Send + Sync {
    fn cancel(&self);
}

/// Failures raised before the event stream opens.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-level failure reaching the upstream.
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// Non-2xx answer before any content was streamed.
    #[error("upstream returned status {status}: {summary}")]
    Status { status: u16, summary: String },

    /// The request exceeded the configured inflight bound.
    #[error("upstream request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl LlmError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status(status: u16, summary: impl Into<String>) -> Self {
        Self::Status {
            status,
            summary: summary.into(),
        }
    }
}
