//! Toponym relay server binary.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toponym_relay::adapters::http::chat::{app, ChatAppState};
use toponym_relay::adapters::llm::{
    CompletionsClient, CompletionsConfig, ResponsesClient, ResponsesConfig, TOPONYM_INSTRUCTIONS,
};
use toponym_relay::config::{AppConfig, UpstreamConfig, UpstreamProtocol};
use toponym_relay::ports::LlmClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = build_client(&config.upstream);
    if client.is_none() {
        warn!("upstream credentials not configured; /api/chat will answer 500 until they are set");
    }

    let state = ChatAppState::new(client, TOPONYM_INSTRUCTIONS);
    let router = app(state, &config.server.cors_origins_list());

    let addr = config.server.socket_addr();
    info!(%addr, protocol = ?config.upstream.protocol, "toponym relay listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Builds the upstream client the configuration selects, or `None` when
/// the required credentials are missing.
fn build_client(upstream: &UpstreamConfig) -> Option<Arc<dyn LlmClient>> {
    let api_key = upstream.api_key()?;

    match upstream.protocol {
        UpstreamProtocol::Responses => {
            let vector_store_id = upstream.vector_store_id()?;
            let mut config = ResponsesConfig::new(api_key, vector_store_id)
                .with_base_url(upstream.base_url.clone())
                .with_max_results(upstream.max_results)
                .with_timeout(upstream.timeout());
            if let Some(model) = &upstream.model {
                config = config.with_model(model.clone());
            }
            Some(Arc::new(ResponsesClient::new(config)))
        }
        UpstreamProtocol::Completions => {
            let mut config = CompletionsConfig::new(api_key)
                .with_base_url(upstream.base_url.clone())
                .with_timeout(upstream.timeout());
            if let Some(model) = &upstream.model {
                config = config.with_model(model.clone());
            }
            Some(Arc::new(CompletionsClient::new(config)))
        }
    }
}
