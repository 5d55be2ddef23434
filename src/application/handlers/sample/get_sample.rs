//! GetSampleHandler - Query handler for one sample.

use std::sync::Arc;

use crate::domain::foundation::SampleId;
use crate::domain::sample::{Sample, SampleError};
use crate::ports::SampleRepository;

#[derive(Debug, Clone)]
pub struct GetSampleQuery {
    /// Sample to fetch.
    pub sample_id: SampleId,
}

pub struct GetSampleHandler {
    repository: Arc<dyn SampleRepository>,
}

impl GetSampleHandler {
    pub fn new(repository: Arc<dyn SampleRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetSampleQuery) -> Result<Sample, SampleError> {
        self.repository
            .find_by_id(query.sample_id)
            .await?
            .ok_or_else(|| SampleError::not_found(query.sample_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySampleRepository;

    #[tokio::test]
    async fn missing_sample_is_not_found() {
        let handler = GetSampleHandler::new(Arc::new(InMemorySampleRepository::new()));
        let err = handler
            .handle(GetSampleQuery {
                sample_id: SampleId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SampleError::NotFound(_)));
    }
}
