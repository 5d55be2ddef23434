//! UpdateSampleHandler - patches operational fields of a sample.
//!
//! Status is not patchable; it moves only through receive, cancel and
//! recomputation.

use std::sync::Arc;

use crate::domain::foundation::SampleId;
use crate::domain::sample::{Sample, SampleError, SamplePatch};
use crate::ports::SampleRepository;

use super::resolve::write_error;

#[derive(Debug, Clone)]
pub struct UpdateSampleCommand {
    /// Sample to change.
    pub sample_id: SampleId,
    /// Operational fields to replace; absent fields are kept.
    pub patch: SamplePatch,
}

pub struct UpdateSampleHandler {
    repository: Arc<dyn SampleRepository>,
}

impl UpdateSampleHandler {
    pub fn new(repository: Arc<dyn SampleRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: UpdateSampleCommand) -> Result<Sample, SampleError> {
        let mut sample = self
            .repository
            .find_by_id(cmd.sample_id)
            .await?
            .ok_or_else(|| SampleError::not_found(cmd.sample_id))?;

        if cmd.patch.is_empty() {
            return Err(SampleError::validation("patch", "Patch contains no changes"));
        }

        sample.apply_patch(cmd.patch)?;
        self.repository
            .update(&sample)
            .await
            .map_err(write_error(sample.id()))?;

        tracing::info!(sample_id = %sample.id(), "sample updated");
        Ok(sample)
    }
}
