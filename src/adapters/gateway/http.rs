//! HTTP gateway - `POST {base_url}/messages/{pattern}` with reqwest.
//!
//! Transport timeouts map to `Timeout`. A structured error body maps to
//! `Remote`. A peer that cannot be reached, or answers without a structured
//! body, is `Unavailable`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::Duration;

use crate::ports::{GatewayError, GatewayRequest, ServiceError, ServiceGateway, ServiceTarget};

/// Header carrying the caller's correlation id.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub struct HttpGateway {
    client: Client,
    base_urls: HashMap<ServiceTarget, String>,
    default_timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_urls: HashMap<ServiceTarget, String>, default_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_urls,
            default_timeout,
        }
    }

    fn url(&self, target: ServiceTarget, pattern: &str) -> Result<String, GatewayError> {
        let base = self
            .base_urls
            .get(&target)
            .ok_or_else(|| GatewayError::Unavailable {
                target,
                message: "no base URL configured".to_string(),
            })?;
        Ok(format!("{}/messages/{}", base.trim_end_matches('/'), pattern))
    }
}

#[async_trait]
impl ServiceGateway for HttpGateway {
    async fn call(&self, request: GatewayRequest) -> Result<JsonValue, GatewayError> {
        let target = request.target;
        let url = self.url(target, &request.pattern)?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        tracing::debug!(%target, pattern = %request.pattern, %url, "http gateway call");

        let mut builder = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&request.payload);
        if let Some(id) = &request.correlation_id {
            builder = builder.header(CORRELATION_HEADER, id);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    target,
                    pattern: request.pattern.clone(),
                    after_ms: timeout.as_millis() as u64,
                }
            } else {
                GatewayError::Unavailable {
                    target,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    target,
                    pattern: request.pattern.clone(),
                    after_ms: timeout.as_millis() as u64,
                }
            } else {
                GatewayError::Unavailable {
                    target,
                    message: e.to_string(),
                }
            }
        })?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| GatewayError::Codec(e.to_string()));
        }

        match serde_json::from_slice::<ServiceError>(&body) {
            Ok(error) => Err(GatewayError::Remote { target, error }),
            Err(_) => Err(GatewayError::Unavailable {
                target,
                message: format!("HTTP {} without error body", status),
            }),
        }
    }
}
