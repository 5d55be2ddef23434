//! Release repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ReleaseId, SampleId};
use crate::domain::release::Release;

/// Outcome of inserting a release for a sample.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted,
    /// A release for the same sample already exists.
    Existing(Release),
}

/// Repository port for QA releases.
///
/// # Guarantees
///
/// - at most one release per sample
/// - `update_pending` writes only while the stored decision is `Pending`
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// Allocate the next release sequence number for a calendar year.
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError>;

    /// Insert unless a release already exists for the sample.
    async fn insert_unique(&self, release: &Release) -> Result<InsertOutcome, DomainError>;

    /// Persist checklist or decision changes.
    ///
    /// # Errors
    ///
    /// - `ReleaseNotFound` if the release does not exist
    /// - `DecisionAlreadyRecorded` if the stored decision is already terminal
    /// - `ConcurrentModification` if the stored version moved on
    async fn update_pending(&self, release: &Release) -> Result<(), DomainError>;

    /// Persist delivery bookkeeping only.
    async fn record_delivery(&self, release: &Release) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: ReleaseId) -> Result<Option<Release>, DomainError>;

    async fn find_by_sample(&self, sample_id: SampleId) -> Result<Option<Release>, DomainError>;

    /// Decided releases whose disposition has not been confirmed yet.
    async fn list_pending_delivery(&self) -> Result<Vec<Release>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ReleaseRepository) {}
    }
}
