//! Disposition delivery to the domain owning the released entity.
//!
//! Goods receipts belong to inventory; batches and production orders belong
//! to batch/production. Both answer `qa.disposition.apply` and deduplicate
//! on `releaseId`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::request;
use crate::adapters::messaging::patterns::DISPOSITION_APPLY;
use crate::domain::foundation::{CommandMetadata, DomainError};
use crate::domain::release::DispositionEvent;
use crate::domain::sample::SourceType;
use crate::ports::{DispositionSink, ServiceGateway, ServiceTarget};

/// Owning service for an entity type.
pub fn route(entity_type: SourceType) -> ServiceTarget {
    match entity_type {
        SourceType::GoodsReceipt => ServiceTarget::Inventory,
        SourceType::Batch | SourceType::ProductionOrder => ServiceTarget::Batch,
    }
}

pub struct GatewayDispositionSink {
    gateway: Arc<dyn ServiceGateway>,
    timeout: Option<Duration>,
}

impl GatewayDispositionSink {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl DispositionSink for GatewayDispositionSink {
    async fn deliver(
        &self,
        event: &DispositionEvent,
        metadata: &CommandMetadata,
    ) -> Result<(), DomainError> {
        let payload = json!({
            "releaseId": event.release_id,
            "entityType": event.entity_type,
            "entityId": event.entity_id,
            "decision": event.decision,
            "decidedAt": event.decided_at,
        });
        let mut call = request(route(event.entity_type), DISPOSITION_APPLY, payload, metadata);
        if let Some(timeout) = self.timeout {
            call = call.with_timeout(timeout);
        }
        self.gateway.call(call).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DocumentNumber, ErrorCode, ReleaseId, Timestamp};
    use crate::domain::release::Decision;
    use crate::ports::{GatewayError, GatewayRequest};
    use serde_json::Value as JsonValue;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingGateway {
        requests: Mutex<Vec<GatewayRequest>>,
        timeout: bool,
    }

    #[async_trait]
    impl ServiceGateway for CapturingGateway {
        async fn call(&self, request: GatewayRequest) -> Result<JsonValue, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.timeout {
                return Err(GatewayError::Timeout {
                    target: request.target,
                    pattern: request.pattern,
                    after_ms: 10,
                });
            }
            Ok(json!({ "applied": true }))
        }
    }

    fn event(entity_type: SourceType) -> DispositionEvent {
        DispositionEvent {
            release_id: ReleaseId::new(),
            release_number: DocumentNumber::release(2026, 7),
            entity_type,
            entity_id: "B-42".into(),
            decision: Decision::Release,
            decided_at: Timestamp::now(),
        }
    }

    #[test]
    fn routing_table() {
        assert_eq!(route(SourceType::GoodsReceipt), ServiceTarget::Inventory);
        assert_eq!(route(SourceType::Batch), ServiceTarget::Batch);
        assert_eq!(route(SourceType::ProductionOrder), ServiceTarget::Batch);
    }

    #[tokio::test]
    async fn sends_apply_with_release_id() {
        let gateway = Arc::new(CapturingGateway::default());
        let sink = GatewayDispositionSink::new(gateway.clone());
        let event = event(SourceType::ProductionOrder);

        sink.deliver(&event, &CommandMetadata::test_fixture()).await.unwrap();

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, ServiceTarget::Batch);
        assert_eq!(requests[0].pattern, "qa.disposition.apply");
        assert_eq!(requests[0].payload["releaseId"], json!(event.release_id));
        assert_eq!(requests[0].payload["entityType"], "production_order");
        assert_eq!(requests[0].payload["decision"], "release");
        assert!(requests[0].correlation_id.is_some());
    }

    #[tokio::test]
    async fn timeout_surfaces_as_gateway_timeout() {
        let gateway = Arc::new(CapturingGateway {
            timeout: true,
            ..Default::default()
        });
        let err = GatewayDispositionSink::new(gateway)
            .deliver(&event(SourceType::GoodsReceipt), &CommandMetadata::test_fixture())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayTimeout);
    }
}
