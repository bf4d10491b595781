//! Domain layer - core types with no framework dependencies.

pub mod relay;
