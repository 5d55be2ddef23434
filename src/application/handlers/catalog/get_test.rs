//! GetTestHandler - Query handler for one test definition.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, TestDefinition};
use crate::domain::foundation::TestId;
use crate::ports::TestRepository;

/// Query for a test with its specifications.
#[derive(Debug, Clone)]
pub struct GetTestQuery {
    /// Test definition to fetch.
    pub test_id: TestId,
}

pub struct GetTestHandler {
    repository: Arc<dyn TestRepository>,
}

impl GetTestHandler {
    pub fn new(repository: Arc<dyn TestRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetTestQuery) -> Result<TestDefinition, CatalogError> {
        self.repository
            .find_by_id(query.test_id)
            .await?
            .ok_or(CatalogError::NotFound(query.test_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTestRepository;
    use crate::domain::catalog::test_support::assay;

    #[tokio::test]
    async fn returns_stored_test() {
        let repo = Arc::new(InMemoryTestRepository::new());
        let test = assay("AS-01");
        repo.insert(&test, true).await.unwrap();

        let found = GetTestHandler::new(repo)
            .handle(GetTestQuery { test_id: test.id() })
            .await
            .unwrap();
        assert_eq!(found, test);
    }

    #[tokio::test]
    async fn missing_test_is_not_found() {
        let handler = GetTestHandler::new(Arc::new(InMemoryTestRepository::new()));
        let err = handler
            .handle(GetTestQuery {
                test_id: TestId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
