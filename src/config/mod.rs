//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOPONYM_RELAY` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use toponym_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Relay listening on {}", config.server.socket_addr());
//! ```

mod error;
mod server;
mod upstream;

pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use upstream::{UpstreamConfig, UpstreamProtocol};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, CORS, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream LLM service configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `TOPONYM_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TOPONYM_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TOPONYM_RELAY__UPSTREAM__API_KEY=...` -> `upstream.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types. Missing upstream credentials are not a load error; see
    /// [`UpstreamConfig::is_configured`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOPONYM_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.upstream.validate()?;
        Ok(())
    }
}
