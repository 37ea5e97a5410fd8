//! Rootline Kernel Library
//!
//! This library exposes kernel internals for integration testing.
//! The main entry point for running the server is the `rootline` binary.

pub mod config;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod models;
pub mod modules;
pub mod permissions;
pub mod routes;
pub mod state;
pub mod theme;

pub use config::{Config, SiteConfig};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the full application router.
///
/// Middleware layers (last added = first executed in request flow):
/// TraceLayer → remote user → routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::module::router(state.routes()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_request_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
