//! Result repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ResultId, SampleId};
use crate::domain::result::TestResult;

/// Repository port for test results.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Insert or overwrite the result for `(sample_id, test_id)`.
    ///
    /// When a result already exists for the pair it is superseded in place
    /// (same id, next revision, review cleared). Returns the stored result.
    async fn upsert(&self, result: TestResult) -> Result<TestResult, DomainError>;

    /// Persist review fields of an existing result.
    ///
    /// # Errors
    ///
    /// - `ResultNotFound` if the result does not exist
    async fn update(&self, result: &TestResult) -> Result<(), DomainError>;

    /// Delete a result. Missing ids are ignored.
    ///
    /// Only used to withdraw a result that landed on a cancelled sample.
    async fn remove(&self, id: ResultId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: ResultId) -> Result<Option<TestResult>, DomainError>;

    /// All results recorded for a sample, oldest first.
    async fn list_for_sample(&self, sample_id: SampleId) -> Result<Vec<TestResult>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ResultRepository) {}
    }
}
