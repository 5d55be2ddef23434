//! ServiceGateway port - synchronous calls across service boundaries.
//!
//! Every cross-service interaction goes through this port, including calls
//! between services hosted in the same process.
//!
//! ## Outcome semantics
//!
//! - `Ok(response)` - the remote operation completed
//! - `Timeout` - **unknown outcome**; the remote may or may not have acted
//! - `Remote` - the remote answered with a structured failure
//! - `Unavailable` - the call never reached a handler
//!
//! Callers retry only operations that are idempotent on the receiving side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind};

/// A service that owns message patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTarget {
    Catalog,
    Qc,
    Qa,
    /// External inventory domain (goods receipts).
    Inventory,
    /// External batch/production domain.
    Batch,
}

impl ServiceTarget {
    pub const ALL: [ServiceTarget; 5] = [
        ServiceTarget::Catalog,
        ServiceTarget::Qc,
        ServiceTarget::Qa,
        ServiceTarget::Inventory,
        ServiceTarget::Batch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTarget::Catalog => "catalog",
            ServiceTarget::Qc => "qc",
            ServiceTarget::Qa => "qa",
            ServiceTarget::Inventory => "inventory",
            ServiceTarget::Batch => "batch",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request/response call.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub target: ServiceTarget,
    pub pattern: String,
    pub payload: JsonValue,
    /// Overrides the gateway's default timeout.
    pub timeout: Option<Duration>,
    pub correlation_id: Option<String>,
}

impl GatewayRequest {
    pub fn new(target: ServiceTarget, pattern: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            target,
            pattern: pattern.into(),
            payload,
            timeout: None,
            correlation_id: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_correlation_id(mut self, id: Option<String>) -> Self {
        self.correlation_id = id;
        self
    }
}

/// Error code for a pattern no handler answers.
pub const UNKNOWN_PATTERN: &str = "UNKNOWN_PATTERN";

/// Structured failure returned by a service endpoint.
///
/// This is also the wire body of every failed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let kind = code.kind();
        Self {
            kind,
            code: code.as_str().to_string(),
            message: message.into(),
            retryable: kind.is_retryable(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn unknown_pattern(pattern: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            code: UNKNOWN_PATTERN.to_string(),
            message: format!("No handler for message pattern '{}'", pattern),
            retryable: false,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        ServiceError::new(err.code, err.message)
    }
}

/// Gateway call failures.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("{target}/{pattern} timed out after {after_ms}ms; outcome unknown")]
    Timeout {
        target: ServiceTarget,
        pattern: String,
        after_ms: u64,
    },

    #[error("{target} rejected the call: {error}")]
    Remote {
        target: ServiceTarget,
        error: ServiceError,
    },

    #[error("{target} is unavailable: {message}")]
    Unavailable {
        target: ServiceTarget,
        message: String,
    },

    #[error("Gateway payload error: {0}")]
    Codec(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Remote { .. } | GatewayError::Unavailable { .. } => ErrorKind::Remote,
            GatewayError::Codec(_) => ErrorKind::Internal,
        }
    }

    /// The remote error kind, for calls the remote answered.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayError::Remote { error, .. } => Some(error.kind),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::Timeout { target, .. } => {
                DomainError::new(ErrorCode::GatewayTimeout, message)
                    .with_detail("target", target.as_str())
            }
            GatewayError::Remote { target, error } => {
                DomainError::new(ErrorCode::RemoteFailure, message)
                    .with_detail("target", target.as_str())
                    .with_detail("remote_kind", error.kind.as_str())
                    .with_detail("remote_code", error.code)
            }
            GatewayError::Unavailable { target, .. } => {
                DomainError::new(ErrorCode::ServiceUnavailable, message)
                    .with_detail("target", target.as_str())
            }
            GatewayError::Codec(_) => DomainError::new(ErrorCode::SerializationError, message),
        }
    }
}

/// Port for cross-service request/response calls.
#[async_trait]
pub trait ServiceGateway: Send + Sync {
    /// Invoke `request.pattern` on `request.target`.
    async fn call(&self, request: GatewayRequest) -> Result<JsonValue, GatewayError>;
}

/// Inbound side: a service that answers message patterns.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// The service this handler implements.
    fn service(&self) -> ServiceTarget;

    /// Patterns this handler answers.
    fn patterns(&self) -> &'static [&'static str];

    /// Handle one message.
    async fn handle(
        &self,
        pattern: &str,
        payload: JsonValue,
        correlation_id: Option<String>,
    ) -> Result<JsonValue, ServiceError>;
}
