//! CreateSampleHandler - Command handler for opening a QC sample.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, DocumentNumber, EventId, SampleId, SerializableDomainEvent, TestId, Timestamp,
};
use crate::domain::sample::{Sample, SampleCreated, SampleDraft, SampleError};
use crate::ports::{EventPublisher, SampleRepository, TestCatalog};

use super::resolve::resolve_tests;

/// Command to create a sample with its initial test assignments.
#[derive(Debug, Clone)]
pub struct CreateSampleCommand {
    /// Source, material and quantity of the new sample.
    pub draft: SampleDraft,
    /// Catalog tests to assign at creation.
    pub test_ids: Vec<TestId>,
}

/// Result of successful sample creation.
#[derive(Debug, Clone)]
pub struct CreateSampleResult {
    /// The stored sample, in `Pending`.
    pub sample: Sample,
    /// The published `sample.created.v1` event.
    pub event: SampleCreated,
}

/// Handler for creating samples.
pub struct CreateSampleHandler {
    repository: Arc<dyn SampleRepository>,
    catalog: Arc<dyn TestCatalog>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateSampleHandler {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        catalog: Arc<dyn TestCatalog>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            catalog,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSampleCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateSampleResult, SampleError> {
        // 1. Resolve and denormalize the requested tests through the catalog
        let tests = resolve_tests(self.catalog.as_ref(), &cmd.test_ids, &metadata).await?;

        // 2. Number the sample
        let year = Timestamp::now().year();
        let sequence = self.repository.next_sequence(year).await?;
        let number = DocumentNumber::sample(year, sequence);

        // 3. Build and persist sample + assignments as one unit
        let sample = Sample::new(SampleId::new(), number, cmd.draft, tests)?;
        self.repository.insert(&sample).await?;

        tracing::info!(
            sample_id = %sample.id(),
            sample_number = %sample.sample_number(),
            source = %sample.source(),
            tests = sample.assigned_tests().len(),
            "sample created"
        );

        // 4. Publish event
        let event = SampleCreated {
            event_id: EventId::new(),
            sample_id: sample.id(),
            sample_number: sample.sample_number().clone(),
            source: sample.source().clone(),
            material_id: sample.material().material_id.clone(),
            test_count: sample.assigned_tests().len(),
            created_at: *sample.requested_at(),
        };

        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());

        self.event_publisher.publish(envelope).await?;

        Ok(CreateSampleResult { sample, event })
    }
}
