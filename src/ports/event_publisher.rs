//! Outbound domain events.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Sink for the envelopes handlers emit after a successful write.
///
/// Delivery is at-least-once; subscribers deduplicate on `event_id`.
/// Handlers publish only after the repository call has returned, so an
/// error here is reported to the caller but never undoes the write.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// In order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
