//! Sample repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SampleId};
use crate::domain::sample::Sample;

/// Repository port for samples and their assigned tests.
///
/// Writes are optimistic: `update` only succeeds when the stored version is
/// exactly one behind the aggregate's.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Allocate the next sample sequence number for a calendar year.
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError>;

    /// Insert a sample with its assigned tests atomically.
    async fn insert(&self, sample: &Sample) -> Result<(), DomainError>;

    /// Persist a mutated sample.
    ///
    /// # Errors
    ///
    /// - `SampleNotFound` if the sample does not exist
    /// - `ConcurrentModification` if another writer got there first
    async fn update(&self, sample: &Sample) -> Result<(), DomainError>;

    /// Persist a cancelled sample, but only while no result is stored for it.
    ///
    /// The result check and the write are one atomic step, so a result
    /// recorded concurrently either blocks the cancellation or is seen as
    /// belonging to a cancelled sample by its submitter.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if a result exists for the sample
    /// - `SampleNotFound`, `ConcurrentModification` as for `update`
    async fn cancel(&self, sample: &Sample) -> Result<(), DomainError>;

    /// Find a sample by id, assigned tests included.
    async fn find_by_id(&self, id: SampleId) -> Result<Option<Sample>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SampleRepository) {}
    }
}
