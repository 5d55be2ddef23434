//! DecideHandler - records the terminal QA decision on a release.
//!
//! The write is guarded on the stored decision still being `Pending`, so of
//! two concurrent decisions exactly one is persisted.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, EventId, ReleaseId, SerializableDomainEvent, UserId,
};
use crate::domain::release::{Decision, DispositionEvent, Release, ReleaseDecided, ReleaseError};
use crate::ports::{EventPublisher, ReleaseRepository};

#[derive(Debug, Clone)]
pub struct DecideCommand {
    /// Release under review.
    pub release_id: ReleaseId,
    /// Release, reject or hold.
    pub decision: Decision,
    /// Reviewer notes; blank remarks are dropped.
    pub remarks: Option<String>,
    /// QA reviewer signing the decision.
    pub decided_by: UserId,
}

#[derive(Debug, Clone)]
pub struct DecideResult {
    /// The release with its decision recorded.
    pub release: Release,
    /// To be delivered to the domain owning the entity.
    pub disposition: DispositionEvent,
    /// The published `release.decided.v1` event.
    pub event: ReleaseDecided,
}

pub struct DecideHandler {
    releases: Arc<dyn ReleaseRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl DecideHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            releases,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: DecideCommand,
        metadata: CommandMetadata,
    ) -> Result<DecideResult, ReleaseError> {
        let mut release = self
            .releases
            .find_by_id(cmd.release_id)
            .await?
            .ok_or(ReleaseError::NotFound(cmd.release_id))?;

        let disposition = release.decide(cmd.decision, cmd.remarks, cmd.decided_by)?;

        if let Err(err) = self.releases.update_pending(&release).await {
            tracing::warn!(
                release_id = %cmd.release_id,
                error = %err,
                "decision write lost"
            );
            return Err(err.into());
        }

        tracing::info!(
            release_id = %release.id(),
            release_number = %release.release_number(),
            decision = %release.decision(),
            entity = %release.entity(),
            "release decided"
        );

        let event = ReleaseDecided {
            event_id: EventId::new(),
            release_id: release.id(),
            decision: release.decision(),
            entity: release.entity().clone(),
            decided_by: metadata.user_id.to_string(),
            decided_at: disposition.decided_at,
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(DecideResult {
            release,
            disposition,
            event,
        })
    }
}
