//! DispositionSink port - pushes QA decisions to the owning domain.

use async_trait::async_trait;

use crate::domain::foundation::{CommandMetadata, DomainError};
use crate::domain::release::DispositionEvent;

/// Delivers a decided disposition to the inventory or batch domain.
///
/// Receivers must be idempotent on `event.release_id`; callers retry after
/// timeouts.
#[async_trait]
pub trait DispositionSink: Send + Sync {
    /// Returns only after the owning domain confirmed receipt.
    ///
    /// # Errors
    ///
    /// - `GatewayTimeout` when the outcome is unknown
    /// - `RemoteFailure` / `ServiceUnavailable` when delivery failed
    async fn deliver(
        &self,
        event: &DispositionEvent,
        metadata: &CommandMetadata,
    ) -> Result<(), DomainError>;
}
