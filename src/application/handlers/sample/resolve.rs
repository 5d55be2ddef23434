//! Shared lookups for sample handlers.

use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, SampleId, TestId};
use crate::domain::sample::{AssignedTest, SampleError};
use crate::ports::TestCatalog;

/// Resolve test ids through the catalog, denormalizing name and code.
///
/// Duplicate ids are resolved once. Unknown or inactive tests fail the
/// whole request.
pub(super) async fn resolve_tests(
    catalog: &dyn TestCatalog,
    test_ids: &[TestId],
    metadata: &CommandMetadata,
) -> Result<Vec<AssignedTest>, SampleError> {
    if test_ids.is_empty() {
        return Err(SampleError::validation(
            "testIds",
            "At least one test must be assigned",
        ));
    }

    let mut assigned: Vec<AssignedTest> = Vec::with_capacity(test_ids.len());
    for &test_id in test_ids {
        if assigned.iter().any(|a| a.test_id == test_id) {
            continue;
        }
        let test = catalog
            .get_test(test_id, metadata)
            .await?
            .filter(|t| t.is_active())
            .ok_or(SampleError::UnknownTest(test_id))?;
        assigned.push(AssignedTest::new(test.id(), test.name(), test.code()));
    }
    Ok(assigned)
}

/// Map a failed sample write, keeping stale-version failures distinct.
pub(super) fn write_error(sample_id: SampleId) -> impl FnOnce(DomainError) -> SampleError {
    move |err| {
        if err.code == ErrorCode::ConcurrentModification {
            SampleError::ConcurrentModification(sample_id)
        } else {
            err.into()
        }
    }
}
