//! Upstream LLM service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upstream LLM service configuration
///
/// Credentials are deliberately optional: the server boots without them
/// and answers the chat endpoint with a configuration error instead of
/// refusing to start, matching the hosting model where environment
/// variables are provisioned separately from deploys.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API key for the upstream service
    pub api_key: Option<Secret<String>>,

    /// Identifier of the grounding corpus (vector store)
    pub vector_store_id: Option<String>,

    /// Wire protocol generation to speak
    #[serde(default)]
    pub protocol: UpstreamProtocol,

    /// Model identifier override; unset uses the protocol default
    pub model: Option<String>,

    /// Base URL of the upstream API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds (also bounds stalled streams)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retrieval matches per request
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// Upstream wire protocol generation
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProtocol {
    /// Responses API: server-side continuity token plus hosted retrieval
    #[default]
    Responses,
    /// Legacy chat-completions API: stateless, no retrieval tool
    Completions,
}

impl UpstreamConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key, if a non-empty one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Grounding corpus id, if a non-empty one is configured
    pub fn vector_store_id(&self) -> Option<&str> {
        self.vector_store_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Whether everything the selected protocol needs is present
    pub fn is_configured(&self) -> bool {
        match self.protocol {
            UpstreamProtocol::Responses => {
                self.api_key().is_some() && self.vector_store_id().is_some()
            }
            UpstreamProtocol::Completions => self.api_key().is_some(),
        }
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.max_results == 0 || self.max_results > 50 {
            return Err(ValidationError::InvalidResultCap);
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            vector_store_id: None,
            protocol: UpstreamProtocol::default(),
            model: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_results: default_max_results(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_results() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_config_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.protocol, UpstreamProtocol::Responses);
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_results, 20);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_responses_needs_key_and_corpus() {
        let config = UpstreamConfig {
            api_key: Some(Secret::new("sk-xxx".to_string())),
            ..Default::default()
        };
        assert!(!config.is_configured());

        let config = UpstreamConfig {
            api_key: Some(Secret::new("sk-xxx".to_string())),
            vector_store_id: Some("vs_123".to_string()),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn test_completions_needs_only_key() {
        let config = UpstreamConfig {
            api_key: Some(Secret::new("sk-xxx".to_string())),
            protocol: UpstreamProtocol::Completions,
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let config = UpstreamConfig {
            api_key: Some(Secret::new(String::new())),
            protocol: UpstreamProtocol::Completions,
            ..Default::default()
        };
        assert!(config.api_key().is_none());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_timeout_duration() {
        let config = UpstreamConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = UpstreamConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let config = UpstreamConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_result_cap_out_of_range() {
        let config = UpstreamConfig {
            max_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = UpstreamConfig {
            max_results: 51,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
