//! TestCatalog port - the QC services' view of the test catalog.
//!
//! Implemented over the gateway; QC never reads the catalog store directly.

use async_trait::async_trait;

use crate::domain::catalog::TestDefinition;
use crate::domain::foundation::{CommandMetadata, DomainError, TestId};

/// Read access to catalog test definitions.
#[async_trait]
pub trait TestCatalog: Send + Sync {
    /// Fetch a test with its specifications. `None` if the catalog has no
    /// such test.
    async fn get_test(
        &self,
        id: TestId,
        metadata: &CommandMetadata,
    ) -> Result<Option<TestDefinition>, DomainError>;

    /// Active tests applicable to a material, by explicit binding or category.
    async fn list_for_material(
        &self,
        material_id: Option<&str>,
        category: Option<&str>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TestDefinition>, DomainError>;
}
