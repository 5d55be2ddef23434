//! In-memory implementation of TestRepository.

use async_trait::async_trait;
use std::collections::HashMap;

use super::InMemoryStore;
use crate::domain::catalog::TestDefinition;
use crate::domain::foundation::{DomainError, ErrorCode, TestId};
use crate::ports::TestRepository;

/// In-memory test catalog store.
#[derive(Default)]
pub struct InMemoryTestRepository {
    store: InMemoryStore<HashMap<TestId, TestDefinition>>,
}

impl InMemoryTestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_code_free(
    tests: &HashMap<TestId, TestDefinition>,
    test: &TestDefinition,
) -> Result<(), DomainError> {
    let taken = tests
        .values()
        .any(|other| other.id() != test.id() && other.code() == test.code());
    if taken {
        return Err(
            DomainError::new(
                ErrorCode::DuplicateTestCode,
                format!("Test code '{}' already exists", test.code()),
            )
            .with_detail("code", test.code()),
        );
    }
    Ok(())
}

fn sorted(mut tests: Vec<TestDefinition>) -> Vec<TestDefinition> {
    tests.sort_by(|a, b| a.code().cmp(b.code()));
    tests
}

#[async_trait]
impl TestRepository for InMemoryTestRepository {
    async fn insert(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError> {
        self.store.transaction(|tests| {
            if unique_code {
                ensure_code_free(tests, test)?;
            }
            tests.insert(test.id(), test.clone());
            Ok(())
        })
    }

    async fn update(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError> {
        self.store.transaction(|tests| {
            if !tests.contains_key(&test.id()) {
                return Err(DomainError::new(
                    ErrorCode::TestNotFound,
                    format!("Test not found: {}", test.id()),
                ));
            }
            if unique_code {
                ensure_code_free(tests, test)?;
            }
            tests.insert(test.id(), test.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: TestId) -> Result<Option<TestDefinition>, DomainError> {
        self.store.read(|tests| tests.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<TestDefinition>, DomainError> {
        let code = code.trim().to_ascii_uppercase();
        self.store
            .read(|tests| tests.values().find(|t| t.code() == code).cloned())
    }

    async fn find_active_for_material(
        &self,
        material_id: &str,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        self.store
            .read(|tests| {
                tests
                    .values()
                    .filter(|t| t.is_active() && t.is_bound_to(material_id))
                    .cloned()
                    .collect()
            })
            .map(sorted)
    }

    async fn find_active_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        self.store
            .read(|tests| {
                tests
                    .values()
                    .filter(|t| t.is_active() && t.in_category(category))
                    .cloned()
                    .collect()
            })
            .map(sorted)
    }

    async fn delete(&self, id: TestId) -> Result<bool, DomainError> {
        self.store.transaction(|tests| Ok(tests.remove(&id).is_some()))
    }
}
