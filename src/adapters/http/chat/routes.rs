//! Axum routes for the chat relay.
//!
//! `chat_routes` is the bare routing table; `app` is the full router with
//! the CORS and tracing layers applied, ready to serve. CORS sits
//! outermost so preflight requests short-circuit without touching a relay
//! session and error responses still carry the cross-origin headers.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health, relay_chat, ChatAppState};

/// Creates routes for the chat relay endpoints.
///
/// - POST /api/chat - streamed relay (SSE)
/// - GET /health - liveness probe
pub fn chat_routes(state: ChatAppState) -> Router {
    Router::new()
        .route("/api/chat", post(relay_chat))
        .route("/health", get(health))
        .with_state(state)
}

/// Full application router with CORS and tracing layers applied.
///
/// An empty `allowed_origins` list means any origin, the deployment
/// default for a separately hosted static front end.
pub fn app(state: ChatAppState, allowed_origins: &[String]) -> Router {
    chat_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> ChatAppState {
        ChatAppState::new(None, "test instructions")
    }

    #[test]
    fn chat_routes_creates_valid_router() {
        let _routes = chat_routes(test_state());
    }

    #[test]
    fn app_creates_layered_router_with_any_origin() {
        let _router = app(test_state(), &[]);
    }

    #[test]
    fn app_creates_layered_router_with_origin_list() {
        let origins = vec!["https://atlas.example.org".to_string()];
        let _router = app(test_state(), &origins);
    }
}
