//! Essence Árabe storefront library.
//!
//! This crate provides the storefront as a library so the router can be
//! built by the binary and driven directly by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::path::Path;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(state.config().rate_limit))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
