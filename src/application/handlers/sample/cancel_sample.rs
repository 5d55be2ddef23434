//! CancelSampleHandler - cancels a sample that has produced no results.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, EventId, SampleId, SerializableDomainEvent,
};
use crate::domain::sample::{Sample, SampleCancelled, SampleError};
use crate::ports::{EventPublisher, ResultRepository, SampleRepository};

use super::resolve::write_error;

#[derive(Debug, Clone)]
pub struct CancelSampleCommand {
    /// The sample to cancel.
    pub sample_id: SampleId,
    /// Why it was cancelled; must not be blank.
    pub reason: String,
}

pub struct CancelSampleHandler {
    samples: Arc<dyn SampleRepository>,
    results: Arc<dyn ResultRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelSampleHandler {
    pub fn new(
        samples: Arc<dyn SampleRepository>,
        results: Arc<dyn ResultRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            samples,
            results,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSampleCommand,
        metadata: CommandMetadata,
    ) -> Result<Sample, SampleError> {
        let mut sample = self
            .samples
            .find_by_id(cmd.sample_id)
            .await?
            .ok_or_else(|| SampleError::not_found(cmd.sample_id))?;

        let has_results = !self.results.list_for_sample(cmd.sample_id).await?.is_empty();
        sample.cancel(&cmd.reason, has_results)?;

        // Rechecked atomically with the write; a result can land after the read above.
        self.samples
            .cancel(&sample)
            .await
            .map_err(write_error(sample.id()))?;

        tracing::info!(
            sample_id = %sample.id(),
            reason = sample.cancellation_reason().unwrap_or_default(),
            "sample cancelled"
        );

        let event = SampleCancelled {
            event_id: EventId::new(),
            sample_id: sample.id(),
            reason: sample.cancellation_reason().unwrap_or_default().to_string(),
            cancelled_at: *sample.updated_at(),
        };

        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());

        self.event_publisher.publish(envelope).await?;

        Ok(sample)
    }
}
