//! Port doubles shared by handler tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::adapters::memory::{InMemoryResultRepository, InMemorySampleRepository};
use crate::domain::catalog::TestDefinition;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, SampleId, TestId};
use crate::domain::release::DispositionEvent;
use crate::domain::result::TestResult;
use crate::domain::sample::Sample;
use crate::ports::{DispositionSink, QcReader, ResultRepository, SampleRepository, TestCatalog};

/// Catalog answering from a fixed list of tests.
pub struct StubCatalog {
    tests: Vec<TestDefinition>,
    failure: Option<DomainError>,
}

impl StubCatalog {
    pub fn with(tests: Vec<TestDefinition>) -> Self {
        Self {
            tests,
            failure: None,
        }
    }

    pub fn failing(err: DomainError) -> Self {
        Self {
            tests: Vec::new(),
            failure: Some(err),
        }
    }

    fn check(&self) -> Result<(), DomainError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TestCatalog for StubCatalog {
    async fn get_test(
        &self,
        id: TestId,
        _metadata: &CommandMetadata,
    ) -> Result<Option<TestDefinition>, DomainError> {
        self.check()?;
        Ok(self.tests.iter().find(|t| t.id() == id).cloned())
    }

    async fn list_for_material(
        &self,
        material_id: Option<&str>,
        category: Option<&str>,
        _metadata: &CommandMetadata,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        self.check()?;
        let active = self.tests.iter().filter(|t| t.is_active());
        let bound: Vec<TestDefinition> = match material_id {
            Some(m) => active.clone().filter(|t| t.is_bound_to(m)).cloned().collect(),
            None => Vec::new(),
        };
        if !bound.is_empty() {
            return Ok(bound);
        }
        Ok(match category {
            Some(c) => active.filter(|t| t.in_category(c)).cloned().collect(),
            None => Vec::new(),
        })
    }
}

/// QC reader going straight to the QC repositories.
pub struct RepoQcReader {
    pub samples: Arc<InMemorySampleRepository>,
    pub results: Arc<InMemoryResultRepository>,
}

#[async_trait]
impl QcReader for RepoQcReader {
    async fn get_sample(
        &self,
        id: SampleId,
        _metadata: &CommandMetadata,
    ) -> Result<Option<Sample>, DomainError> {
        self.samples.find_by_id(id).await
    }

    async fn list_results(
        &self,
        sample_id: SampleId,
        _metadata: &CommandMetadata,
    ) -> Result<Vec<TestResult>, DomainError> {
        self.results.list_for_sample(sample_id).await
    }
}

/// Sink that times out a configured number of times, then records.
#[derive(Default)]
pub struct RecordingSink {
    timeouts_left: Mutex<u32>,
    delivered: Mutex<Vec<DispositionEvent>>,
}

impl RecordingSink {
    pub fn timing_out(times: u32) -> Self {
        Self {
            timeouts_left: Mutex::new(times),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn delivered(&self) -> Vec<DispositionEvent> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DispositionSink for RecordingSink {
    async fn deliver(
        &self,
        event: &DispositionEvent,
        _metadata: &CommandMetadata,
    ) -> Result<(), DomainError> {
        {
            let mut left = self.timeouts_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(DomainError::new(
                    ErrorCode::GatewayTimeout,
                    "inventory/qa.disposition.apply timed out after 50ms; outcome unknown",
                ));
            }
        }
        let mut delivered = self.delivered.lock().unwrap();
        if !delivered.iter().any(|d| d.release_id == event.release_id) {
            delivered.push(event.clone());
        }
        Ok(())
    }
}
