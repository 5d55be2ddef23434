//! In-memory implementation of ResultRepository.

use async_trait::async_trait;
use std::collections::HashMap;

use super::InMemoryStore;
use crate::domain::foundation::{DomainError, ErrorCode, ResultId, SampleId, TestId};
use crate::domain::result::TestResult;
use crate::ports::ResultRepository;

#[derive(Clone, Default)]
struct ResultState {
    results: HashMap<ResultId, TestResult>,
    by_pair: HashMap<(SampleId, TestId), ResultId>,
}

/// In-memory result store keyed by (sample, test).
#[derive(Default)]
pub struct InMemoryResultRepository {
    store: InMemoryStore<ResultState>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous check used inside the sample store's transactions.
    pub(crate) fn has_results_for(&self, sample_id: SampleId) -> Result<bool, DomainError> {
        self.store
            .read(|state| state.by_pair.keys().any(|(s, _)| *s == sample_id))
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn upsert(&self, result: TestResult) -> Result<TestResult, DomainError> {
        self.store.transaction(|state| {
            let pair = (result.sample_id(), result.test_id());
            if let Some(id) = state.by_pair.get(&pair).copied() {
                if let Some(existing) = state.results.get_mut(&id) {
                    existing.supersede(result);
                    return Ok(existing.clone());
                }
            }
            state.by_pair.insert(pair, result.id());
            state.results.insert(result.id(), result.clone());
            Ok(result)
        })
    }

    async fn update(&self, result: &TestResult) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            let slot = state.results.get_mut(&result.id()).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ResultNotFound,
                    format!("Result not found: {}", result.id()),
                )
            })?;
            *slot = result.clone();
            Ok(())
        })
    }

    async fn remove(&self, id: ResultId) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            if let Some(removed) = state.results.remove(&id) {
                state
                    .by_pair
                    .remove(&(removed.sample_id(), removed.test_id()));
            }
            Ok(())
        })
    }

    async fn find_by_id(&self, id: ResultId) -> Result<Option<TestResult>, DomainError> {
        self.store.read(|state| state.results.get(&id).cloned())
    }

    async fn list_for_sample(&self, sample_id: SampleId) -> Result<Vec<TestResult>, DomainError> {
        self.store.read(|state| {
            let mut results: Vec<TestResult> = state
                .results
                .values()
                .filter(|r| r.sample_id() == sample_id)
                .cloned()
                .collect();
            results.sort_by_key(|r| *r.recorded_at());
            results
        })
    }
}
