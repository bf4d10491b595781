//! Application layer - the relay session core.

pub mod session;

pub use session::{FrameStream, RelaySession};
