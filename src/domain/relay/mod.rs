//! Relay domain types: the inbound request and the outbound wire frames.

mod frame;
mod request;

pub use frame::OutboundFrame;
pub use request::{ChatRequest, ConversationState, Language, RequestError, MAX_MESSAGE_LENGTH};
