//! ReceiveSampleHandler - records physical receipt of a sample in the lab.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, EventId, SampleId, SerializableDomainEvent};
use crate::domain::sample::{Sample, SampleError, SampleReceived};
use crate::ports::{EventPublisher, SampleRepository};

use super::resolve::write_error;

#[derive(Debug, Clone)]
pub struct ReceiveSampleCommand {
    /// Sample arriving at the lab.
    pub sample_id: SampleId,
}

pub struct ReceiveSampleHandler {
    repository: Arc<dyn SampleRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ReceiveSampleHandler {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReceiveSampleCommand,
        metadata: CommandMetadata,
    ) -> Result<Sample, SampleError> {
        let mut sample = self
            .repository
            .find_by_id(cmd.sample_id)
            .await?
            .ok_or_else(|| SampleError::not_found(cmd.sample_id))?;

        sample.receive()?;
        self.repository
            .update(&sample)
            .await
            .map_err(write_error(sample.id()))?;

        tracing::info!(
            sample_id = %sample.id(),
            sample_number = %sample.sample_number(),
            "sample received"
        );

        let event = SampleReceived {
            event_id: EventId::new(),
            sample_id: sample.id(),
            sample_number: sample.sample_number().clone(),
            received_at: sample.received_at().copied().unwrap_or(*sample.updated_at()),
        };

        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());

        self.event_publisher.publish(envelope).await?;

        Ok(sample)
    }
}
