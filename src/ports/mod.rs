//! Ports - interfaces between the application core and adapters.

mod llm_client;

pub use llm_client::{
    CancelHandle, EventStream, GenerationRequest, LlmClient, LlmError, LlmStream, StreamEvent,
};
