//! ReviewResultHandler - stamps a reviewer's sign-off on a result.

use std::sync::Arc;

use crate::domain::foundation::{ResultId, UserId};
use crate::domain::result::{ResultError, TestResult};
use crate::ports::ResultRepository;

#[derive(Debug, Clone)]
pub struct ReviewResultCommand {
    /// Result to mark reviewed.
    pub result_id: ResultId,
    /// Second person checking the result.
    pub reviewed_by: UserId,
}

pub struct ReviewResultHandler {
    results: Arc<dyn ResultRepository>,
}

impl ReviewResultHandler {
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self { results }
    }

    pub async fn handle(&self, cmd: ReviewResultCommand) -> Result<TestResult, ResultError> {
        let mut result = self
            .results
            .find_by_id(cmd.result_id)
            .await?
            .ok_or(ResultError::NotFound(cmd.result_id))?;

        result.review(cmd.reviewed_by);
        self.results.update(&result).await?;

        tracing::info!(
            result_id = %result.id(),
            reviewed_by = result.reviewed_by().map(|u| u.as_str()).unwrap_or_default(),
            "result reviewed"
        );
        Ok(result)
    }
}
