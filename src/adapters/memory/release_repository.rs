//! In-memory implementation of ReleaseRepository.

use async_trait::async_trait;
use std::collections::HashMap;

use super::InMemoryStore;
use crate::domain::foundation::{DomainError, ErrorCode, ReleaseId, SampleId};
use crate::domain::release::{DeliveryStatus, Release};
use crate::ports::{InsertOutcome, ReleaseRepository};

#[derive(Clone, Default)]
struct ReleaseState {
    releases: HashMap<ReleaseId, Release>,
    by_sample: HashMap<SampleId, ReleaseId>,
    sequences: HashMap<i32, u32>,
}

/// In-memory release store: unique per sample, guarded decision writes.
#[derive(Default)]
pub struct InMemoryReleaseRepository {
    store: InMemoryStore<ReleaseState>,
}

impl InMemoryReleaseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: ReleaseId) -> DomainError {
    DomainError::new(ErrorCode::ReleaseNotFound, format!("Release not found: {}", id))
}

#[async_trait]
impl ReleaseRepository for InMemoryReleaseRepository {
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError> {
        self.store.transaction(|state| {
            let seq = state.sequences.entry(year).or_insert(0);
            *seq += 1;
            Ok(*seq)
        })
    }

    async fn insert_unique(&self, release: &Release) -> Result<InsertOutcome, DomainError> {
        self.store.transaction(|state| {
            if let Some(existing) = state
                .by_sample
                .get(&release.sample_id())
                .and_then(|id| state.releases.get(id))
            {
                return Ok(InsertOutcome::Existing(existing.clone()));
            }
            state.by_sample.insert(release.sample_id(), release.id());
            state.releases.insert(release.id(), release.clone());
            Ok(InsertOutcome::Inserted)
        })
    }

    async fn update_pending(&self, release: &Release) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            let stored = state
                .releases
                .get(&release.id())
                .ok_or_else(|| not_found(release.id()))?;
            if stored.decision().is_terminal() {
                return Err(DomainError::new(
                    ErrorCode::DecisionAlreadyRecorded,
                    format!(
                        "Release {} is already decided ({})",
                        stored.release_number(),
                        stored.decision()
                    ),
                ));
            }
            if stored.version() + 1 != release.version() {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!("Release {} was modified concurrently", stored.release_number()),
                ));
            }
            state.releases.insert(release.id(), release.clone());
            Ok(())
        })
    }

    async fn record_delivery(&self, release: &Release) -> Result<(), DomainError> {
        self.store.transaction(|state| {
            let stored = state
                .releases
                .get(&release.id())
                .ok_or_else(|| not_found(release.id()))?;
            if stored.delivery_status() == DeliveryStatus::Delivered {
                return Ok(());
            }
            state.releases.insert(release.id(), release.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: ReleaseId) -> Result<Option<Release>, DomainError> {
        self.store.read(|state| state.releases.get(&id).cloned())
    }

    async fn find_by_sample(&self, sample_id: SampleId) -> Result<Option<Release>, DomainError> {
        self.store.read(|state| {
            state
                .by_sample
                .get(&sample_id)
                .and_then(|id| state.releases.get(id))
                .cloned()
        })
    }

    async fn list_pending_delivery(&self) -> Result<Vec<Release>, DomainError> {
        self.store.read(|state| {
            let mut pending: Vec<Release> = state
                .releases
                .values()
                .filter(|r| r.delivery_status() == DeliveryStatus::Pending)
                .cloned()
                .collect();
            pending.sort_by_key(|r| r.decided_at().copied());
            pending
        })
    }
}
