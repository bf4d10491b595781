//! Adapters - concrete implementations of ports and transports.

pub mod http;
pub mod llm;
