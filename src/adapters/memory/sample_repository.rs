//! In-memory implementation of SampleRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{InMemoryResultRepository, InMemoryStore};
use crate::domain::foundation::{DomainError, ErrorCode, SampleId};
use crate::domain::sample::Sample;
use crate::ports::SampleRepository;

#[derive(Clone, Default)]
struct SampleState {
    samples: HashMap<SampleId, Sample>,
    sequences: HashMap<i32, u32>,
}

/// In-memory sample store with optimistic version checks.
///
/// Linked to a result store with [`with_results`], cancellation refuses
/// samples that have results. Unlinked, it only checks versions.
///
/// [`with_results`]: InMemorySampleRepository::with_results
#[derive(Default)]
pub struct InMemorySampleRepository {
    store: InMemoryStore<SampleState>,
    results: Option<Arc<InMemoryResultRepository>>,
}

impl InMemorySampleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: Arc<InMemoryResultRepository>) -> Self {
        Self {
            store: InMemoryStore::new(),
            results: Some(results),
        }
    }
}

fn write_versioned(state: &mut SampleState, sample: &Sample) -> Result<(), DomainError> {
    let stored = state.samples.get(&sample.id()).ok_or_else(|| {
        DomainError::new(
            ErrorCode::SampleNotFound,
            format!("Sample not found: {}", sample.id()),
        )
    })?;
    if stored.version() + 1 != sample.version() {
        return Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            format!(
                "Sample {} is at version {}, write expected {}",
                sample.sample_number(),
                stored.version(),
                sample.version() - 1
            ),
        ));
    }
    state.samples.insert(sample.id(), sample.clone());
    Ok(())
}

#[async_trait]
impl SampleRepository for InMemorySampleRepository {
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError> {
        self.store.transaction(|state| {
            let seq = state.sequences.entry(year).or_insert(0);
            *seq += 1;
            Ok(*seq)
        })
    }

    async fn insert(&self, sample: &Sample) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            let number_taken = state
                .samples
                .values()
                .any(|s| s.sample_number() == sample.sample_number());
            if number_taken || state.samples.contains_key(&sample.id()) {
                return Err(DomainError::database(format!(
                    "Sample {} already exists",
                    sample.sample_number()
                )));
            }
            state.samples.insert(sample.id(), sample.clone());
            Ok(())
        })
    }

    async fn update(&self, sample: &Sample) -> Result<(), DomainError> {
        self.store.transaction(|state| write_versioned(state, sample))
    }

    async fn cancel(&self, sample: &Sample) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            if let Some(results) = &self.results {
                if results.has_results_for(sample.id())? {
                    return Err(DomainError::invalid_transition(format!(
                        "Sample {} already has recorded results",
                        sample.sample_number()
                    )));
                }
            }
            write_versioned(state, sample)
        })
    }

    async fn find_by_id(&self, id: SampleId) -> Result<Option<Sample>, DomainError> {
        self.store.read(|state| state.samples.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TestId, UserId};
    use crate::domain::result::{Evaluation, ResultSubmission, TestResult};
    use crate::domain::sample::test_support::sample_with;
    use crate::ports::ResultRepository;

    #[tokio::test]
    async fn sequences_are_per_year() {
        let repo = InMemorySampleRepository::new();
        assert_eq!(repo.next_sequence(2026).await.unwrap(), 1);
        assert_eq!(repo.next_sequence(2026).await.unwrap(), 2);
        assert_eq!(repo.next_sequence(2027).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let repo = InMemorySampleRepository::new();
        let sample = sample_with(&[TestId::new()]);
        repo.insert(&sample).await.unwrap();

        let mut first = sample.clone();
        first.receive().unwrap();
        repo.update(&first).await.unwrap();

        let mut second = sample.clone();
        second.cancel("Duplicate", false).unwrap();
        let err = repo.update(&second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);

        let stored = repo.find_by_id(sample.id()).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn cancel_is_refused_once_a_result_is_stored() {
        let results = Arc::new(InMemoryResultRepository::new());
        let repo = InMemorySampleRepository::with_results(results.clone());
        let test_id = TestId::new();
        let sample = sample_with(&[test_id]);
        repo.insert(&sample).await.unwrap();

        // Cancelled in memory after a stale "no results" read.
        let mut cancelled = sample.clone();
        cancelled.cancel("Container damaged", false).unwrap();
        results
            .upsert(result_for(sample.id(), test_id))
            .await
            .unwrap();

        let err = repo.cancel(&cancelled).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        let stored = repo.find_by_id(sample.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), sample.version());
    }

    #[tokio::test]
    async fn cancel_without_results_is_written() {
        let repo = InMemorySampleRepository::with_results(Arc::new(InMemoryResultRepository::new()));
        let sample = sample_with(&[TestId::new()]);
        repo.insert(&sample).await.unwrap();

        let mut cancelled = sample.clone();
        cancelled.cancel("Duplicate request", false).unwrap();
        repo.cancel(&cancelled).await.unwrap();

        let stored = repo.find_by_id(sample.id()).await.unwrap().unwrap();
        assert_eq!(stored, cancelled);
    }

    fn result_for(sample_id: SampleId, test_id: TestId) -> TestResult {
        TestResult::record(
            sample_id,
            test_id,
            ResultSubmission {
                parameter: None,
                result_value: "White powder".into(),
                unit: None,
                tested_by: UserId::new("analyst-1").unwrap(),
                tested_at: None,
            },
            Evaluation {
                passed: true,
                numeric_value: None,
                deviation: None,
            },
        )
    }
}
