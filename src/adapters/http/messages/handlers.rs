//! HTTP handlers for the message endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value as JsonValue};

use crate::adapters::gateway::CORRELATION_HEADER;
use crate::domain::foundation::ErrorKind;
use crate::ports::{MessageHandler, ServiceError, ServiceTarget};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Services hosted by this process, indexed by the patterns they answer.
#[derive(Clone)]
pub struct MessagingAppState {
    routes: Arc<HashMap<&'static str, Arc<dyn MessageHandler>>>,
    services: Arc<Vec<ServiceTarget>>,
}

impl MessagingAppState {
    pub fn new(handlers: Vec<Arc<dyn MessageHandler>>) -> Self {
        let mut routes = HashMap::new();
        let mut services = Vec::new();
        for handler in handlers {
            services.push(handler.service());
            for pattern in handler.patterns() {
                routes.insert(*pattern, handler.clone());
            }
        }
        Self {
            routes: Arc::new(routes),
            services: Arc::new(services),
        }
    }

    fn handler_for(&self, pattern: &str) -> Option<Arc<dyn MessageHandler>> {
        self.routes.get(pattern).cloned()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /messages/:pattern - Dispatch one message to the owning service
pub async fn dispatch_message(
    State(state): State<MessagingAppState>,
    Path(pattern): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(handler) = state.handler_for(&pattern) else {
        return error_response(ServiceError::unknown_pattern(&pattern));
    };

    let payload = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice::<JsonValue>(&body) {
            Ok(payload) => payload,
            Err(e) => {
                return error_response(ServiceError::validation(format!("Invalid JSON body: {}", e)))
            }
        }
    };

    let correlation_id = headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match handler.handle(&pattern, payload, correlation_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::warn!(
                %pattern,
                kind = err.kind.as_str(),
                code = %err.code,
                error = %err.message,
                "message failed"
            );
            error_response(err)
        }
    }
}

/// GET /health - Liveness and hosted services
pub async fn health(State(state): State<MessagingAppState>) -> Response {
    let services: Vec<&str> = state.services.iter().map(|s| s.as_str()).collect();
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "services": services })),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Remote => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ServiceError) -> Response {
    (status_for(err.kind), Json(err)).into_response()
}
