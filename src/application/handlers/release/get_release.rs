//! Release lookups by id and by sample.

use std::sync::Arc;

use crate::domain::foundation::{ReleaseId, SampleId};
use crate::domain::release::{Release, ReleaseError};
use crate::ports::ReleaseRepository;

#[derive(Debug, Clone)]
pub enum GetReleaseQuery {
    ById(ReleaseId),
    BySample(SampleId),
}

pub struct GetReleaseHandler {
    releases: Arc<dyn ReleaseRepository>,
}

impl GetReleaseHandler {
    pub fn new(releases: Arc<dyn ReleaseRepository>) -> Self {
        Self { releases }
    }

    pub async fn handle(&self, query: GetReleaseQuery) -> Result<Release, ReleaseError> {
        match query {
            GetReleaseQuery::ById(id) => self
                .releases
                .find_by_id(id)
                .await?
                .ok_or(ReleaseError::NotFound(id)),
            GetReleaseQuery::BySample(sample_id) => self
                .releases
                .find_by_sample(sample_id)
                .await?
                .ok_or(ReleaseError::SampleNotFound(sample_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryReleaseRepository;
    use crate::domain::release::test_support::release_with;

    #[tokio::test]
    async fn finds_by_id_and_sample() {
        let repo = Arc::new(InMemoryReleaseRepository::new());
        let release = release_with(vec![], vec![]);
        repo.insert_unique(&release).await.unwrap();
        let handler = GetReleaseHandler::new(repo);

        let by_id = handler
            .handle(GetReleaseQuery::ById(release.id()))
            .await
            .unwrap();
        let by_sample = handler
            .handle(GetReleaseQuery::BySample(release.sample_id()))
            .await
            .unwrap();
        assert_eq!(by_id, by_sample);
    }

    #[tokio::test]
    async fn missing_release_is_not_found() {
        let handler = GetReleaseHandler::new(Arc::new(InMemoryReleaseRepository::new()));
        let err = handler
            .handle(GetReleaseQuery::ById(ReleaseId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::NotFound(_)));

        let err = handler
            .handle(GetReleaseQuery::BySample(SampleId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::SampleNotFound(_)));
    }
}
