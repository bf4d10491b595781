//! Outbound wire frames for the SSE push channel.

use serde_json::json;

/// One unit pushed to the caller over the push channel.
///
/// Frames preserve the relative order of the upstream events that produced
/// them, and nothing may follow [`OutboundFrame::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// New conversation state token for the caller to persist.
    State(String),
    /// Incremental answer text.
    Content(String),
    /// Human-readable failure summary.
    Error(String),
    /// Terminal sentinel; the sequence is closed.
    Done,
}

impl OutboundFrame {
    /// Whether this frame closes the outbound sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboundFrame::Done)
    }

    /// Payload of the frame's `data:` line.
    ///
    /// JSON for the three content-bearing variants, the literal `[DONE]`
    /// sentinel for the terminal frame.
    pub fn payload(&self) -> String {
        match self {
            OutboundFrame::State(token) => json!({ "state": token }).to_string(),
            OutboundFrame::Content(text) => json!({ "content": text }).to_string(),
            OutboundFrame::Error(message) => json!({ "error": message }).to_string(),
            OutboundFrame::Done => "[DONE]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_frame_payload() {
        let frame = OutboundFrame::State("tok-1".to_string());
        assert_eq!(frame.payload(), r#"{"state":"tok-1"}"#);
        assert!(!frame.is_terminal());
    }

    #[test]
    fn content_frame_payload() {
        let frame = OutboundFrame::Content("Cap Bruny".to_string());
        assert_eq!(frame.payload(), r#"{"content":"Cap Bruny"}"#);
    }

    #[test]
    fn content_frame_escapes_json() {
        let frame = OutboundFrame::Content("ligne\n\"citée\"".to_string());
        let payload = frame.payload();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&payload).unwrap()["content"],
            "ligne\n\"citée\""
        );
    }

    #[test]
    fn error_frame_payload() {
        let frame = OutboundFrame::Error("timeout".to_string());
        assert_eq!(frame.payload(), r#"{"error":"timeout"}"#);
        assert!(!frame.is_terminal());
    }

    #[test]
    fn done_frame_is_literal_sentinel() {
        assert_eq!(OutboundFrame::Done.payload(), "[DONE]");
        assert!(OutboundFrame::Done.is_terminal());
    }
}
