//! SSE plumbing shared by the upstream client adapters.
//!
//! Upstream bytes arrive on arbitrary chunk boundaries, so `data:` lines
//! are reassembled incrementally before each protocol's parser sees them.
//! Cancellation rides a `watch` channel: firing it ends the event stream
//! at the next poll, which drops the HTTP body and aborts the connection.

use std::sync::Arc;

use futures::{stream, Stream, StreamExt};
use tokio::sync::watch;

use crate::ports::{CancelHandle, EventStream, StreamEvent};

/// Incremental decoder for the `data:` lines of an SSE byte stream.
///
/// `event:`/`id:` fields and comment lines are skipped: both upstream
/// dialects carry everything needed inside the data payload.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the `data:` payloads it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Builds a cancellable event stream out of an upstream SSE byte stream.
///
/// `parse` maps one `data:` payload to at most one event; payloads it
/// returns `None` for are dropped. A transport failure mid-body becomes a
/// single terminal [`StreamEvent::UpstreamError`].
pub(super) fn sse_event_stream<B, C>(
    bytes: B,
    mut parse: impl FnMut(&str) -> Option<StreamEvent> + Send + 'static,
) -> (EventStream, Arc<dyn CancelHandle>)
where
    B: Stream<Item = Result<C, reqwest::Error>> + Send + 'static,
    C: AsRef<[u8]>,
{
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut decoder = SseLineDecoder::new();

    let events = bytes
        .map(move |chunk| match chunk {
            Ok(chunk) => decoder
                .feed(chunk.as_ref())
                .iter()
                .filter_map(|payload| parse(payload))
                .collect::<Vec<_>>(),
            Err(e) => vec![StreamEvent::UpstreamError(format!(
                "answer stream interrupted: {e}"
            ))],
        })
        .flat_map(stream::iter)
        .take_until(wait_cancelled(cancel_rx));

    (Box::pin(events), Arc::new(WatchCancel(cancel_tx)))
}

async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    // Err means the sender side is gone, which also ends the stream.
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}

/// Cancel handle backed by the watch channel feeding `take_until`.
struct WatchCancel(watch::Sender<bool>);

impl CancelHandle for WatchCancel {
    fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_complete_event() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: {\"content\":\"hi\"}\n\n");
        assert_eq!(payloads, vec![r#"{"content":"hi"}"#]);
    }

    #[test]
    fn decodes_multiple_events_in_one_chunk() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: one\n\ndata: two\n\n");
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[test]
    fn buffers_line_split_across_chunks() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(b"data: {\"content\":").is_empty());
        let payloads = decoder.feed(b"\"joined\"}\n\n");
        assert_eq!(payloads, vec![r#"{"content":"joined"}"#]);
    }

    #[test]
    fn handles_multibyte_char_split_across_chunks() {
        let text = "data: rivière\n";
        let bytes = text.as_bytes();
        // Split inside the two-byte "è".
        let split = text.find('è').unwrap() + 1;

        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let payloads = decoder.feed(&bytes[split..]);
        assert_eq!(payloads, vec!["rivière"]);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: windows\r\n\r\n");
        assert_eq!(payloads, vec!["windows"]);
    }

    #[test]
    fn skips_non_data_lines() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"event: response.created\n: comment\nid: 3\ndata: kept\n\n");
        assert_eq!(payloads, vec!["kept"]);
    }

    #[test]
    fn passes_done_sentinel_through() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: [DONE]\n\n");
        assert_eq!(payloads, vec!["[DONE]"]);
    }

    mod event_stream {
        use super::*;
        use futures::StreamExt;

        fn ok(chunk: &str) -> Result<Vec<u8>, reqwest::Error> {
            Ok(chunk.as_bytes().to_vec())
        }

        #[tokio::test]
        async fn maps_payloads_through_parser_in_order() {
            let chunks = stream::iter(vec![ok("data: a\n"), ok("data: skip\ndata: b\n")]);
            let (events, _cancel) = sse_event_stream(chunks, |payload| {
                (payload != "skip").then(|| StreamEvent::TextDelta(payload.to_string()))
            });

            let collected: Vec<StreamEvent> = events.collect().await;
            assert_eq!(
                collected,
                vec![
                    StreamEvent::TextDelta("a".to_string()),
                    StreamEvent::TextDelta("b".to_string()),
                ]
            );
        }

        #[tokio::test]
        async fn cancel_ends_stream_at_next_poll() {
            // An endless source: the pending chunk never resolves.
            let chunks = stream::iter(vec![ok("data: first\n")])
                .chain(stream::pending::<Result<Vec<u8>, reqwest::Error>>());
            let (mut events, cancel) = sse_event_stream(chunks, |payload| {
                Some(StreamEvent::TextDelta(payload.to_string()))
            });

            assert_eq!(
                events.next().await,
                Some(StreamEvent::TextDelta("first".to_string()))
            );
            cancel.cancel();
            assert_eq!(events.next().await, None);
        }
    }
}
