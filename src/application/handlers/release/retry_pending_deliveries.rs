//! RetryPendingDeliveriesHandler - re-attempts every undelivered disposition.
//!
//! Caller-driven; nothing schedules it. Attempts run concurrently and one
//! failing release never stops the sweep.

use futures::future::join_all;
use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, DocumentNumber, ReleaseId};
use crate::domain::release::ReleaseError;
use crate::ports::ReleaseRepository;

use super::DeliverDispositionHandler;

/// Outcome of one delivery attempt within a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub release_id: ReleaseId,
    pub release_number: DocumentNumber,
    pub delivered: bool,
    pub error: Option<String>,
}

pub struct RetryPendingDeliveriesHandler {
    releases: Arc<dyn ReleaseRepository>,
    deliver: Arc<DeliverDispositionHandler>,
}

impl RetryPendingDeliveriesHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        deliver: Arc<DeliverDispositionHandler>,
    ) -> Self {
        Self { releases, deliver }
    }

    pub async fn handle(
        &self,
        metadata: CommandMetadata,
    ) -> Result<Vec<DeliveryAttempt>, ReleaseError> {
        let pending = self.releases.list_pending_delivery().await?;
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(count = pending.len(), "retrying pending dispositions");

        let attempts: Vec<DeliveryAttempt> = join_all(pending.into_iter().map(|release| {
            let metadata = &metadata;
            async move {
                let release_id = release.id();
                let release_number = release.release_number().clone();
                let outcome = self.deliver.deliver(release, metadata).await;
                DeliveryAttempt {
                    release_id,
                    release_number,
                    delivered: outcome.is_ok(),
                    error: outcome.err().map(|e| e.to_string()),
                }
            }
        }))
        .await;

        let failed = attempts.iter().filter(|a| !a.delivered).count();
        tracing::info!(
            attempted = attempts.len(),
            failed,
            "disposition retry sweep finished"
        );
        Ok(attempts)
    }
}
