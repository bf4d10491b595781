//! Toponym Relay - streaming conversational backend for the toponyms atlas.
//!
//! Receives one user message over HTTP, relays it to an upstream LLM
//! service with retrieval grounding enabled, and streams the answer back
//! to the caller as Server-Sent Events. Conversation continuity is
//! caller-held: an opaque state token travels with each request and the
//! server keeps nothing between turns.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
