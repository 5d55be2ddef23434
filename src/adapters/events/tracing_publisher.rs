//! Event publisher that writes each envelope to the structured log.
//!
//! Services run without a broker; the log line is the audit trail.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes domain events as `tracing` records on the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            target: "audit",
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or(""),
            user_id = event.metadata.user_id.as_deref().unwrap_or(""),
            payload = %event.payload,
            "domain event"
        );
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn publishing_never_fails() {
        let publisher = TracingEventPublisher::new();
        let envelope = EventEnvelope::new("release.decided.v1", "r-1", "Release", json!({}))
            .with_correlation_id("corr-1");
        assert!(publisher.publish(envelope).await.is_ok());
        assert!(publisher.publish_all(vec![]).await.is_ok());
    }
}
