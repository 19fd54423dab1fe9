//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: adapter selection (directory, mail transport, activity log)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: inbound payloads and their adapters to domain readings
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{self, WebhookAuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(webhook_secret: &str, services: AppServices) -> Router {
    let auth_state = WebhookAuthState::new(webhook_secret);

    // Protected routes: the secret is checked before any body is read.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::webhook_auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
