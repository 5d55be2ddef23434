//! QcReader port - the QA service's read access to QC data.

use async_trait::async_trait;

use crate::domain::foundation::{CommandMetadata, DomainError, SampleId};
use crate::domain::result::TestResult;
use crate::domain::sample::Sample;

/// Authoritative QC state, re-read by QA before every submission.
#[async_trait]
pub trait QcReader: Send + Sync {
    /// `None` if QC has no such sample.
    async fn get_sample(
        &self,
        id: SampleId,
        metadata: &CommandMetadata,
    ) -> Result<Option<Sample>, DomainError>;

    /// All results currently recorded for a sample.
    async fn list_results(
        &self,
        sample_id: SampleId,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TestResult>, DomainError>;
}
