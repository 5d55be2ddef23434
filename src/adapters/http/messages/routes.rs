//! Route configuration for the message endpoint.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{dispatch_message, health, MessagingAppState};

/// Creates the service router.
///
/// Routes:
/// - `POST /messages/:pattern` - Dispatch a message to the hosted service
/// - `GET /health` - Liveness and hosted services
pub fn messaging_router(state: MessagingAppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/messages/:pattern", post(dispatch_message))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
