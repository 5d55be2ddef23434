//! In-process gateway - dispatches to service handlers hosted in this binary.
//!
//! Targets without a local handler fall through to the remote gateway when
//! one is configured. The timeout is enforced here for local calls too, so a
//! co-hosted service behaves like a remote one.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::ports::{
    GatewayError, GatewayRequest, MessageHandler, ServiceError, ServiceGateway, ServiceTarget,
};

pub struct InProcessGateway {
    handlers: RwLock<HashMap<ServiceTarget, Arc<dyn MessageHandler>>>,
    remote: Option<Arc<dyn ServiceGateway>>,
    default_timeout: Duration,
}

impl InProcessGateway {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            remote: None,
            default_timeout,
        }
    }

    /// Targets not registered locally are sent through `remote`.
    pub fn with_remote(mut self, remote: Arc<dyn ServiceGateway>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Register a co-hosted service. Replaces any earlier handler for the
    /// same target.
    pub fn register(&self, handler: Arc<dyn MessageHandler>) {
        let target = handler.service();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.insert(target, handler);
        tracing::debug!(%target, "service registered with in-process gateway");
    }

    pub fn is_local(&self, target: ServiceTarget) -> bool {
        self.local(target).is_some()
    }

    fn local(&self, target: ServiceTarget) -> Option<Arc<dyn MessageHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&target)
            .cloned()
    }
}

#[async_trait]
impl ServiceGateway for InProcessGateway {
    async fn call(&self, request: GatewayRequest) -> Result<JsonValue, GatewayError> {
        let target = request.target;
        let Some(handler) = self.local(target) else {
            return match &self.remote {
                Some(remote) => remote.call(request).await,
                None => Err(GatewayError::Unavailable {
                    target,
                    message: "no local handler and no remote route".to_string(),
                }),
            };
        };

        if !handler.patterns().contains(&request.pattern.as_str()) {
            return Err(GatewayError::Remote {
                target,
                error: ServiceError::unknown_pattern(&request.pattern),
            });
        }

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        tracing::debug!(
            %target,
            pattern = %request.pattern,
            timeout_ms = timeout.as_millis() as u64,
            "in-process call"
        );

        let call = handler.handle(&request.pattern, request.payload, request.correlation_id);
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) => Err(GatewayError::Remote { target, error }),
            Err(_) => Err(GatewayError::Timeout {
                target,
                pattern: request.pattern,
                after_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
