//! Upstream LLM client adapters.
//!
//! One adapter per upstream protocol generation (responses, legacy chat
//! completions), a scripted mock for tests, and the SSE plumbing they
//! share. All adapters implement the `LlmClient` port; the relay session
//! never sees which dialect is behind it.

mod completions_client;
mod instructions;
mod mock_client;
mod responses_client;
mod sse;

pub use completions_client::{CompletionsClient, CompletionsConfig};
pub use instructions::TOPONYM_INSTRUCTIONS;
pub use mock_client::MockLlmClient;
pub use responses_client::{ResponsesClient, ResponsesConfig};
pub use sse::SseLineDecoder;
