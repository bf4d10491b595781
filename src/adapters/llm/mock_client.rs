//! Scripted LLM client for tests.
//!
//! Plays back fixed event sequences, records generation requests, and
//! counts cancellations so tests can pin relay behavior down without a
//! network. Lives next to the real adapters rather than behind
//! `#[cfg(test)]` so integration tests can use it too.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ports::{CancelHandle, GenerationRequest, LlmClient, LlmError, LlmStream, StreamEvent};

/// Scripted implementation of the `LlmClient` port.
///
/// Outcomes are consumed in order; once the script runs out, streams
/// default to a single short answer.
#[derive(Clone, Default)]
pub struct MockLlmClient {
    script: Arc<Mutex<VecDeque<ScriptedOutcome>>>,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    cancels: Arc<AtomicUsize>,
}

/// One scripted `open_stream` outcome.
#[derive(Debug, Clone)]
enum ScriptedOutcome {
    /// The stream opens and plays these events in order.
    Events(Vec<StreamEvent>),
    /// `open_stream` fails before any event is produced.
    FailToOpen(String),
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a stream that plays `events` in order.
    pub fn with_events(self, events: Vec<StreamEvent>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Events(events));
        self
    }

    /// Queues an `open_stream` failure.
    pub fn with_open_error(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::FailToOpen(message.into()));
        self
    }

    /// Number of times a stream's cancel hook was invoked.
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Number of `open_stream` calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The most recent generation request, if any.
    pub fn last_call(&self) -> Option<GenerationRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn next_outcome(&self) -> ScriptedOutcome {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                ScriptedOutcome::Events(vec![
                    StreamEvent::TextDelta("mock answer".to_string()),
                    StreamEvent::Done,
                ])
            })
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn open_stream(&self, request: GenerationRequest) -> Result<LlmStream, LlmError> {
        self.calls.lock().unwrap().push(request);

        match self.next_outcome() {
            ScriptedOutcome::Events(events) => Ok(LlmStream {
                events: Box::pin(stream::iter(events)),
                cancel: Arc::new(CountingCancel(self.cancels.clone())),
            }),
            ScriptedOutcome::FailToOpen(message) => Err(LlmError::Transport(message)),
        }
    }
}

/// Counts cancel invocations for assertions.
struct CountingCancel(Arc<AtomicUsize>);

impl CancelHandle for CountingCancel {
    fn cancel(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn test_request() -> GenerationRequest {
        GenerationRequest {
            instructions: "instructions".to_string(),
            input: "hello".to_string(),
            state_token: None,
        }
    }

    #[tokio::test]
    async fn plays_scripted_events_in_order() {
        let mock = MockLlmClient::new().with_events(vec![
            StreamEvent::TextDelta("a".to_string()),
            StreamEvent::TextDelta("b".to_string()),
            StreamEvent::Done,
        ]);

        let stream = mock.open_stream(test_request()).await.unwrap();
        let events: Vec<StreamEvent> = stream.events.collect().await;

        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("a".to_string()),
                StreamEvent::TextDelta("b".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn outcomes_are_consumed_in_order() {
        let mock = MockLlmClient::new()
            .with_events(vec![StreamEvent::Done])
            .with_open_error("down");

        assert!(mock.open_stream(test_request()).await.is_ok());
        let err = mock.open_stream(test_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(message) if message == "down"));
    }

    #[tokio::test]
    async fn defaults_to_short_answer_when_script_is_exhausted() {
        let mock = MockLlmClient::new();

        let stream = mock.open_stream(test_request()).await.unwrap();
        let events: Vec<StreamEvent> = stream.events.collect().await;

        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn records_calls() {
        let mock = MockLlmClient::new();
        assert_eq!(mock.call_count(), 0);

        mock.open_stream(test_request()).await.unwrap();
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_call().unwrap().input, "hello");
    }

    #[tokio::test]
    async fn counts_cancellations() {
        let mock = MockLlmClient::new().with_events(vec![StreamEvent::Done]);

        let stream = mock.open_stream(test_request()).await.unwrap();
        assert_eq!(mock.cancel_count(), 0);

        stream.cancel.cancel();
        stream.cancel.cancel();
        assert_eq!(mock.cancel_count(), 2);
    }
}
