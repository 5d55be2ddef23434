//! Test definition repository port.
//!
//! A test and its specifications are one persistence unit: every write
//! replaces the specification set inside the same transaction.

use async_trait::async_trait;

use crate::domain::catalog::TestDefinition;
use crate::domain::foundation::{DomainError, TestId};

/// Repository port for test definitions.
#[async_trait]
pub trait TestRepository: Send + Sync {
    /// Insert a test with its specifications atomically.
    ///
    /// # Errors
    ///
    /// - `DuplicateTestCode` if `unique_code` is set and the code is taken
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError>;

    /// Update a test, replacing its specifications wholesale.
    ///
    /// # Errors
    ///
    /// - `TestNotFound` if the test does not exist
    /// - `DuplicateTestCode` if `unique_code` is set and another test has the code
    async fn update(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError>;

    /// Find a test by id, specifications included.
    async fn find_by_id(&self, id: TestId) -> Result<Option<TestDefinition>, DomainError>;

    /// Find a test by its (normalized) code.
    async fn find_by_code(&self, code: &str) -> Result<Option<TestDefinition>, DomainError>;

    /// Active tests explicitly bound to a material.
    async fn find_active_for_material(
        &self,
        material_id: &str,
    ) -> Result<Vec<TestDefinition>, DomainError>;

    /// Active tests in a category (case-insensitive).
    async fn find_active_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<TestDefinition>, DomainError>;

    /// Hard-delete a test and its specifications. Returns false if absent.
    async fn delete(&self, id: TestId) -> Result<bool, DomainError>;
}
