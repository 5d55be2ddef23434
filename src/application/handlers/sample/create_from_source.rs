//! CreateSampleFromSourceHandler - opens a sample for a source event,
//! choosing tests from the catalog instead of taking them from the caller.

use std::sync::Arc;

use crate::domain::foundation::CommandMetadata;
use crate::domain::sample::{SampleDraft, SampleError};
use crate::ports::{EventPublisher, SampleRepository, TestCatalog};

use super::create_sample::{CreateSampleCommand, CreateSampleHandler, CreateSampleResult};

/// Command to create a sample with catalog-resolved tests.
#[derive(Debug, Clone)]
pub struct CreateSampleFromSourceCommand {
    /// Sample details taken from the source request.
    pub draft: SampleDraft,
    /// Material category used when no test is bound to the material.
    pub category: Option<String>,
}

pub struct CreateSampleFromSourceHandler {
    catalog: Arc<dyn TestCatalog>,
    create: CreateSampleHandler,
}

impl CreateSampleFromSourceHandler {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        catalog: Arc<dyn TestCatalog>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            create: CreateSampleHandler::new(repository, catalog.clone(), event_publisher),
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSampleFromSourceCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateSampleResult, SampleError> {
        let material_id = cmd.draft.material.material_id.trim().to_string();
        if material_id.is_empty() {
            return Err(SampleError::validation("materialId", "Material id is required"));
        }

        let tests = self
            .catalog
            .list_for_material(Some(&material_id), cmd.category.as_deref(), &metadata)
            .await?;

        if tests.is_empty() {
            return Err(SampleError::validation(
                "testIds",
                format!("No active catalog tests apply to material {}", material_id),
            ));
        }

        tracing::debug!(
            material_id = %material_id,
            tests = tests.len(),
            "resolved tests for source"
        );

        self.create
            .handle(
                CreateSampleCommand {
                    draft: cmd.draft,
                    test_ids: tests.iter().map(|t| t.id()).collect(),
                },
                metadata,
            )
            .await
    }
}
