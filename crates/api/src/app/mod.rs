//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `services.rs`: store backend selection (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crudapi_infra::ProductStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Store handle shared by all handlers; injected at router construction.
pub type SharedStore = Arc<dyn ProductStore>;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(store)),
        )
}
