//! DeliverDispositionHandler - forwards a decided release to the domain that
//! owns the entity.
//!
//! Delivery is at-least-once. A timeout leaves the outcome unknown, so the
//! release stays `Pending` delivery and is retried; receivers deduplicate on
//! the release id.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, EventId, ReleaseId, SerializableDomainEvent};
use crate::domain::release::{DeliveryStatus, DispositionDelivered, Release, ReleaseError};
use crate::ports::{DispositionSink, EventPublisher, ReleaseRepository};

#[derive(Debug, Clone)]
pub struct DeliverDispositionCommand {
    /// Decided release whose disposition is redelivered.
    pub release_id: ReleaseId,
}

pub struct DeliverDispositionHandler {
    releases: Arc<dyn ReleaseRepository>,
    sink: Arc<dyn DispositionSink>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl DeliverDispositionHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        sink: Arc<dyn DispositionSink>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            releases,
            sink,
            event_publisher,
        }
    }

    /// Attempt delivery once.
    ///
    /// An already delivered release is returned unchanged. A failed attempt
    /// is recorded on the release before the error is returned.
    pub async fn handle(
        &self,
        cmd: DeliverDispositionCommand,
        metadata: CommandMetadata,
    ) -> Result<Release, ReleaseError> {
        let release = self
            .releases
            .find_by_id(cmd.release_id)
            .await?
            .ok_or(ReleaseError::NotFound(cmd.release_id))?;
        self.deliver(release, &metadata).await
    }

    pub(super) async fn deliver(
        &self,
        mut release: Release,
        metadata: &CommandMetadata,
    ) -> Result<Release, ReleaseError> {
        match release.delivery_status() {
            DeliveryStatus::Delivered => return Ok(release),
            DeliveryStatus::NotRequired => return Err(ReleaseError::NothingToDeliver(release.id())),
            DeliveryStatus::Pending => {}
        }
        let disposition = release
            .disposition_event()
            .ok_or(ReleaseError::NothingToDeliver(release.id()))?;

        if let Err(err) = self.sink.deliver(&disposition, metadata).await {
            release.record_delivery_failure(err.message.clone());
            self.releases.record_delivery(&release).await?;
            tracing::warn!(
                release_id = %release.id(),
                entity = %release.entity(),
                attempts = release.delivery_attempts(),
                error_code = %err.code,
                error = %err.message,
                "disposition delivery failed; will retry"
            );
            return Err(err.into());
        }

        release.mark_delivered();
        self.releases.record_delivery(&release).await?;

        tracing::info!(
            release_id = %release.id(),
            entity = %release.entity(),
            decision = %release.decision(),
            attempts = release.delivery_attempts(),
            "disposition delivered"
        );

        let event = DispositionDelivered {
            event_id: EventId::new(),
            release_id: release.id(),
            entity: release.entity().clone(),
            attempts: release.delivery_attempts(),
            delivered_at: release
                .delivered_at()
                .copied()
                .unwrap_or_else(|| *release.updated_at()),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryReleaseRepository;
    use crate::application::handlers::testing::RecordingSink;
    use crate::domain::foundation::{ErrorCode, ErrorKind, UserId};
    use crate::domain::release::test_support::release_with;
    use crate::domain::release::Decision;

    struct Fixture {
        releases: Arc<InMemoryReleaseRepository>,
        sink: Arc<RecordingSink>,
        bus: Arc<InMemoryEventBus>,
        handler: DeliverDispositionHandler,
    }

    fn fixture(sink: RecordingSink) -> Fixture {
        let releases = Arc::new(InMemoryReleaseRepository::new());
        let sink = Arc::new(sink);
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = DeliverDispositionHandler::new(releases.clone(), sink.clone(), bus.clone());
        Fixture {
            releases,
            sink,
            bus,
            handler,
        }
    }

    async fn decided(f: &Fixture, decision: Decision) -> Release {
        let mut release = release_with(vec![], vec![]);
        f.releases.insert_unique(&release).await.unwrap();
        release
            .decide(decision, None, UserId::new("qa-reviewer").unwrap())
            .unwrap();
        f.releases.update_pending(&release).await.unwrap();
        release
    }

    fn deliver(release: &Release) -> DeliverDispositionCommand {
        DeliverDispositionCommand {
            release_id: release.id(),
        }
    }

    #[tokio::test]
    async fn successful_delivery_is_recorded() {
        let f = fixture(RecordingSink::default());
        let release = decided(&f, Decision::Hold).await;

        let delivered = f
            .handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(delivered.delivery_status(), DeliveryStatus::Delivered);
        assert_eq!(delivered.delivery_attempts(), 1);
        let sent = f.sink.delivered();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].decision, Decision::Hold);
        assert_eq!(sent[0].entity_id, "GRI-9");
        assert!(f.bus.has_event("release.delivered.v1"));
        assert!(f.releases.list_pending_delivery().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_keeps_release_pending_and_surfaces_error() {
        let f = fixture(RecordingSink::timing_out(1));
        let release = decided(&f, Decision::Reject).await;

        let err = f
            .handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::GatewayTimeout);
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let stored = f.releases.find_by_id(release.id()).await.unwrap().unwrap();
        assert_eq!(stored.decision(), Decision::Reject);
        assert_eq!(stored.delivery_status(), DeliveryStatus::Pending);
        assert_eq!(stored.delivery_attempts(), 1);
        assert!(stored.last_delivery_error().unwrap().contains("timed out"));

        let retried = f
            .handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap();
        assert_eq!(retried.delivery_status(), DeliveryStatus::Delivered);
        assert_eq!(retried.delivery_attempts(), 2);
        assert!(retried.last_delivery_error().is_none());
    }

    #[tokio::test]
    async fn delivered_release_is_not_sent_again() {
        let f = fixture(RecordingSink::default());
        let release = decided(&f, Decision::Hold).await;

        f.handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap();
        let again = f
            .handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap();

        assert_eq!(again.delivery_attempts(), 1);
        assert_eq!(f.bus.events_of_type("release.delivered.v1").len(), 1);
    }

    #[tokio::test]
    async fn undecided_release_has_nothing_to_deliver() {
        let f = fixture(RecordingSink::default());
        let release = release_with(vec![], vec![]);
        f.releases.insert_unique(&release).await.unwrap();

        let err = f
            .handler
            .handle(deliver(&release), CommandMetadata::test_fixture())
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::NothingToDeliver(_)));
        assert!(f.sink.delivered().is_empty());
    }
}
