//! HTTP endpoint for the streaming chat relay.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{app, chat_routes};
