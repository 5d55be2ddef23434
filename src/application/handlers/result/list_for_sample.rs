//! ListResultsHandler - Query handler for all results of a sample.

use std::sync::Arc;

use crate::domain::foundation::SampleId;
use crate::domain::result::{ResultError, TestResult};
use crate::ports::{ResultRepository, SampleRepository};

#[derive(Debug, Clone)]
pub struct ListResultsQuery {
    /// Sample whose results are listed.
    pub sample_id: SampleId,
}

pub struct ListResultsHandler {
    samples: Arc<dyn SampleRepository>,
    results: Arc<dyn ResultRepository>,
}

impl ListResultsHandler {
    pub fn new(samples: Arc<dyn SampleRepository>, results: Arc<dyn ResultRepository>) -> Self {
        Self { samples, results }
    }

    pub async fn handle(&self, query: ListResultsQuery) -> Result<Vec<TestResult>, ResultError> {
        if self.samples.find_by_id(query.sample_id).await?.is_none() {
            return Err(ResultError::SampleNotFound(query.sample_id));
        }
        Ok(self.results.list_for_sample(query.sample_id).await?)
    }
}
