//! Relay session - the core streaming loop.
//!
//! One session owns one caller request: it opens the upstream event
//! stream, translates each event into outbound frames in arrival order,
//! terminates the outbound sequence exactly once, and aborts the upstream
//! if the caller goes away first. The session holds no state once the
//! terminal frame is out.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tracing::{debug, warn};

use crate::domain::relay::{ChatRequest, OutboundFrame};
use crate::ports::{CancelHandle, EventStream, GenerationRequest, LlmClient, LlmError, StreamEvent};

/// Drives one caller request against the upstream client.
pub struct RelaySession {
    client: Arc<dyn LlmClient>,
    instructions: String,
}

impl RelaySession {
    pub fn new(client: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Self {
        Self {
            client,
            instructions: instructions.into(),
        }
    }

    /// Opens the upstream stream for `request` and returns the outbound
    /// frame sequence.
    ///
    /// An `Err` here means nothing has been streamed yet, so the transport
    /// adapter is still free to answer with an ordinary error response
    /// instead of opening the push channel.
    pub async fn open(self, request: ChatRequest) -> Result<FrameStream, LlmError> {
        let generation = GenerationRequest {
            instructions: self.instructions,
            input: request.directed_message(),
            state_token: request.state_token().cloned(),
        };

        let stream = self.client.open_stream(generation).await?;
        debug!(
            continuing = request.state_token().is_some(),
            "relay session opened"
        );
        Ok(FrameStream::new(stream.events, stream.cancel))
    }
}

/// Ordered, terminated sequence of outbound frames for one session.
///
/// Translates upstream events 1:1 into frames, except that a mid-stream
/// failure yields an error frame followed by the terminal sentinel.
/// Dropping the stream before the sentinel (caller disconnect) aborts the
/// upstream exactly once; events that race past that point are never
/// polled, so they can never be forwarded.
pub struct FrameStream {
    state: SessionState,
}

enum SessionState {
    /// Consuming upstream events.
    Streaming {
        events: EventStream,
        cancel: CancelOnDrop,
    },
    /// Upstream side is finished; frames still owed to the caller.
    Draining(VecDeque<OutboundFrame>),
    /// Terminal sentinel written; the sequence is closed.
    Closed,
}

impl FrameStream {
    fn new(events: EventStream, cancel: Arc<dyn CancelHandle>) -> Self {
        Self {
            state: SessionState::Streaming {
                events,
                cancel: CancelOnDrop::new(cancel),
            },
        }
    }
}

impl Stream for FrameStream {
    type Item = OutboundFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<OutboundFrame>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                SessionState::Streaming { events, cancel } => {
                    match events.as_mut().poll_next(cx) {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(Some(StreamEvent::StateCreated(token))) => {
                            return Poll::Ready(Some(OutboundFrame::State(token.into_inner())));
                        }
                        Poll::Ready(Some(StreamEvent::TextDelta(text))) => {
                            return Poll::Ready(Some(OutboundFrame::Content(text)));
                        }
                        Poll::Ready(Some(StreamEvent::Done)) => {
                            cancel.disarm();
                            this.state = SessionState::Closed;
                            return Poll::Ready(Some(OutboundFrame::Done));
                        }
                        Poll::Ready(Some(StreamEvent::UpstreamError(message))) => {
                            warn!(error = %message, "upstream stream failed mid-flight");
                            cancel.disarm();
                            this.state =
                                SessionState::Draining(VecDeque::from([OutboundFrame::Done]));
                            return Poll::Ready(Some(OutboundFrame::Error(message)));
                        }
                        Poll::Ready(None) => {
                            // Upstream ended without a terminal event; the
                            // caller still gets a cleanly closed sequence.
                            cancel.disarm();
                            this.state = SessionState::Closed;
                            return Poll::Ready(Some(OutboundFrame::Done));
                        }
                    }
                }
                SessionState::Draining(pending) => match pending.pop_front() {
                    Some(frame) => return Poll::Ready(Some(frame)),
                    None => this.state = SessionState::Closed,
                },
                SessionState::Closed => return Poll::Ready(None),
            }
        }
    }
}

/// Fires the upstream cancel hook if the session ends before its terminal
/// frame, i.e. on caller disconnect.
struct CancelOnDrop {
    handle: Arc<dyn CancelHandle>,
    armed: bool,
}

impl CancelOnDrop {
    fn new(handle: Arc<dyn CancelHandle>) -> Self {
        Self {
            handle,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            debug!("caller disconnected before terminal frame; aborting upstream");
            self.handle.cancel();
        }
    }
}
