//! SubmitResultHandler - records one test outcome for a sample.
//!
//! The test definition is fetched from the catalog through the gateway on
//! every submission, so evaluation always uses the current specification.
//! After the result is stored the sample status is recomputed.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::application::handlers::sample::{RecomputeStatusCommand, RecomputeStatusHandler};
use crate::domain::foundation::{
    CommandMetadata, EventId, SampleId, SerializableDomainEvent, TestId,
};
use crate::domain::result::{evaluate, ResultError, ResultRecorded, ResultSubmission, TestResult};
use crate::domain::sample::{Sample, SampleStatus};
use crate::ports::{EventPublisher, ResultRepository, SampleRepository, TestCatalog};

/// Command to submit a result for an assigned test.
#[derive(Debug, Clone)]
pub struct SubmitResultCommand {
    /// Sample the result belongs to.
    pub sample_id: SampleId,
    /// Assigned test the result answers.
    pub test_id: TestId,
    /// Reported value, analyst and timing.
    pub submission: ResultSubmission,
    /// Verdict for qualitative tests; ignored for numeric criteria.
    pub passed: Option<bool>,
    /// Analyst's deviation note; generated when a numeric value fails.
    pub deviation: Option<String>,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitResultResult {
    /// The stored result, with its revision.
    pub result: TestResult,
    /// The sample after status recomputation.
    pub sample: Sample,
    /// The published `result.recorded.v1` event.
    pub event: ResultRecorded,
}

pub struct SubmitResultHandler {
    samples: Arc<dyn SampleRepository>,
    results: Arc<dyn ResultRepository>,
    catalog: Arc<dyn TestCatalog>,
    event_publisher: Arc<dyn EventPublisher>,
    recompute: RecomputeStatusHandler,
    target_tolerance: Decimal,
}

impl SubmitResultHandler {
    pub fn new(
        samples: Arc<dyn SampleRepository>,
        results: Arc<dyn ResultRepository>,
        catalog: Arc<dyn TestCatalog>,
        event_publisher: Arc<dyn EventPublisher>,
        target_tolerance: Decimal,
    ) -> Self {
        Self {
            recompute: RecomputeStatusHandler::new(
                samples.clone(),
                results.clone(),
                event_publisher.clone(),
            ),
            samples,
            results,
            catalog,
            event_publisher,
            target_tolerance,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitResultCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitResultResult, ResultError> {
        // 1. Sample must exist, accept results, and carry the test
        let sample = self
            .samples
            .find_by_id(cmd.sample_id)
            .await?
            .ok_or(ResultError::SampleNotFound(cmd.sample_id))?;

        if !sample.status().accepts_results() {
            return Err(ResultError::SampleNotReady(format!(
                "Sample {} is {}",
                sample.sample_number(),
                sample.status()
            )));
        }
        if !sample.has_test(cmd.test_id) {
            return Err(ResultError::TestNotAssigned {
                sample_id: cmd.sample_id,
                test_id: cmd.test_id,
            });
        }
        if sample.status() == SampleStatus::Completed {
            tracing::warn!(
                sample_id = %cmd.sample_id,
                test_id = %cmd.test_id,
                "result submitted for completed sample; stored result will be superseded"
            );
        }

        // 2. Current definition from the catalog
        let test = self
            .catalog
            .get_test(cmd.test_id, &metadata)
            .await?
            .ok_or(ResultError::TestNotFound(cmd.test_id))?;

        // 3. Evaluate against the chosen specification
        let mut submission = cmd.submission;
        let specification = test.specification_for(submission.parameter.as_deref())?;
        let criteria = test.criteria_for(submission.parameter.as_deref())?;
        if let Some(spec) = specification {
            if submission.parameter.is_none() {
                submission.parameter = Some(spec.parameter().to_string());
            }
            if submission.unit.is_none() {
                submission.unit = spec.unit().map(str::to_string);
            }
        }
        let evaluation = evaluate(
            criteria,
            &submission.result_value,
            cmd.passed,
            cmd.deviation,
            self.target_tolerance,
        )?;

        // 4. Upsert by (sample, test)
        let result = self
            .results
            .upsert(TestResult::record(
                cmd.sample_id,
                cmd.test_id,
                submission,
                evaluation,
            ))
            .await?;

        // A cancellation may have committed between the status check and the upsert.
        let current = self.samples.find_by_id(cmd.sample_id).await?;
        if let Some(cancelled) = current.filter(|s| s.status() == SampleStatus::Cancelled) {
            self.results.remove(result.id()).await?;
            tracing::warn!(
                result_id = %result.id(),
                sample_id = %cmd.sample_id,
                "result withdrawn; sample was cancelled during submission"
            );
            return Err(ResultError::SampleNotReady(format!(
                "Sample {} is {}",
                cancelled.sample_number(),
                cancelled.status()
            )));
        }

        tracing::info!(
            result_id = %result.id(),
            sample_id = %cmd.sample_id,
            test_code = test.code(),
            passed = result.passed(),
            revision = result.revision(),
            "result recorded"
        );

        let event = ResultRecorded {
            event_id: EventId::new(),
            result_id: result.id(),
            sample_id: cmd.sample_id,
            test_id: cmd.test_id,
            passed: result.passed(),
            revision: result.revision(),
            recorded_at: *result.updated_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        // 5. Re-derive sample status from the full result set
        let recomputed = self
            .recompute
            .handle(
                RecomputeStatusCommand {
                    sample_id: cmd.sample_id,
                },
                metadata,
            )
            .await?;

        Ok(SubmitResultResult {
            result,
            sample: recomputed.sample,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryResultRepository, InMemorySampleRepository};
    use crate::application::handlers::testing::StubCatalog;
    use crate::domain::catalog::test_support::{appearance, assay};
    use crate::domain::catalog::{SpecificationDraft, TestDefinition, TestDraft};
    use crate::domain::foundation::{ErrorKind, UserId};
    use crate::application::handlers::sample::{CancelSampleCommand, CancelSampleHandler};
    use crate::domain::foundation::{DomainError, ResultId};
    use crate::domain::sample::test_support::sample_with;
    use async_trait::async_trait;

    struct Fixture {
        samples: Arc<InMemorySampleRepository>,
        results: Arc<InMemoryResultRepository>,
        handler: SubmitResultHandler,
    }

    fn fixture(tests: Vec<TestDefinition>, tolerance: Decimal) -> Fixture {
        let samples = Arc::new(InMemorySampleRepository::new());
        let results = Arc::new(InMemoryResultRepository::new());
        let handler = SubmitResultHandler::new(
            samples.clone(),
            results.clone(),
            Arc::new(StubCatalog::with(tests)),
            Arc::new(InMemoryEventBus::new()),
            tolerance,
        );
        Fixture {
            samples,
            results,
            handler,
        }
    }

    async fn received_sample(f: &Fixture, tests: &[TestId]) -> Sample {
        let mut sample = sample_with(tests);
        sample.receive().unwrap();
        f.samples.insert(&sample).await.unwrap();
        sample
    }

    fn cmd(sample_id: SampleId, test_id: TestId, value: &str) -> SubmitResultCommand {
        SubmitResultCommand {
            sample_id,
            test_id,
            submission: ResultSubmission {
                parameter: None,
                result_value: value.to_string(),
                unit: None,
                tested_by: UserId::new("analyst-1").unwrap(),
                tested_at: None,
            },
            passed: None,
            deviation: None,
        }
    }

    async fn submit(f: &Fixture, cmd: SubmitResultCommand) -> Result<SubmitResultResult, ResultError> {
        f.handler.handle(cmd, CommandMetadata::test_fixture()).await
    }

    #[tokio::test]
    async fn range_boundaries_are_inclusive() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        for (value, expected) in [("95", true), ("115", false), ("90", true), ("110", true)] {
            let outcome = submit(&f, cmd(sample.id(), test.id(), value)).await.unwrap();
            assert_eq!(outcome.result.passed(), expected, "value {}", value);
        }
    }

    #[tokio::test]
    async fn failing_value_gets_generated_deviation_and_spec_unit() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let outcome = submit(&f, cmd(sample.id(), test.id(), "115")).await.unwrap();
        assert!(!outcome.result.passed());
        assert!(outcome.result.deviation().unwrap().contains("115"));
        assert_eq!(outcome.result.unit(), Some("%"));
        assert_eq!(outcome.result.parameter(), Some("Assay"));
    }

    #[tokio::test]
    async fn status_follows_result_set() {
        let (t1, t2) = (assay("AS-01"), appearance("APP-1"));
        let f = fixture(vec![t1.clone(), t2.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[t1.id(), t2.id()]).await;

        let first = submit(&f, cmd(sample.id(), t1.id(), "99")).await.unwrap();
        assert_eq!(first.sample.status(), SampleStatus::InTesting);

        let mut qualitative = cmd(sample.id(), t2.id(), "White powder");
        qualitative.passed = Some(true);
        let second = submit(&f, qualitative).await.unwrap();
        assert_eq!(second.sample.status(), SampleStatus::Completed);
    }

    #[tokio::test]
    async fn resubmission_updates_in_place_and_clears_review() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let first = submit(&f, cmd(sample.id(), test.id(), "88")).await.unwrap();
        let mut reviewed = first.result.clone();
        reviewed.review(UserId::new("reviewer-1").unwrap());
        f.results.update(&reviewed).await.unwrap();

        let second = submit(&f, cmd(sample.id(), test.id(), "101")).await.unwrap();
        assert_eq!(second.result.id(), first.result.id());
        assert!(second.result.passed());
        assert!(!second.result.is_reviewed());
        assert_eq!(f.results.list_for_sample(sample.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completed_sample_accepts_a_correction() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let first = submit(&f, cmd(sample.id(), test.id(), "115")).await.unwrap();
        assert_eq!(first.sample.status(), SampleStatus::Completed);

        let corrected = submit(&f, cmd(sample.id(), test.id(), "101")).await.unwrap();
        assert_eq!(corrected.result.id(), first.result.id());
        assert_eq!(corrected.result.revision(), 2);
        assert!(corrected.result.passed());
        assert_eq!(corrected.sample.status(), SampleStatus::Completed);
    }

    /// Result store that lets a cancellation commit just before each upsert.
    struct CancelBeforeUpsert {
        inner: Arc<InMemoryResultRepository>,
        cancel: CancelSampleHandler,
    }

    #[async_trait]
    impl ResultRepository for CancelBeforeUpsert {
        async fn upsert(&self, result: TestResult) -> Result<TestResult, DomainError> {
            self.cancel
                .handle(
                    CancelSampleCommand {
                        sample_id: result.sample_id(),
                        reason: "Container damaged".into(),
                    },
                    CommandMetadata::test_fixture(),
                )
                .await
                .unwrap();
            self.inner.upsert(result).await
        }

        async fn update(&self, result: &TestResult) -> Result<(), DomainError> {
            self.inner.update(result).await
        }

        async fn remove(&self, id: ResultId) -> Result<(), DomainError> {
            self.inner.remove(id).await
        }

        async fn find_by_id(&self, id: ResultId) -> Result<Option<TestResult>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn list_for_sample(&self, sample_id: SampleId) -> Result<Vec<TestResult>, DomainError> {
            self.inner.list_for_sample(sample_id).await
        }
    }

    #[tokio::test]
    async fn cancellation_during_submission_withdraws_the_result() {
        let test = assay("AS-01");
        let results = Arc::new(InMemoryResultRepository::new());
        let samples = Arc::new(InMemorySampleRepository::with_results(results.clone()));
        let bus = Arc::new(InMemoryEventBus::new());
        let racing = Arc::new(CancelBeforeUpsert {
            inner: results.clone(),
            cancel: CancelSampleHandler::new(samples.clone(), results.clone(), bus.clone()),
        });
        let handler = SubmitResultHandler::new(
            samples.clone(),
            racing,
            Arc::new(StubCatalog::with(vec![test.clone()])),
            bus.clone(),
            Decimal::ZERO,
        );
        let mut sample = sample_with(&[test.id()]);
        sample.receive().unwrap();
        samples.insert(&sample).await.unwrap();

        let err = handler
            .handle(cmd(sample.id(), test.id(), "99"), CommandMetadata::test_fixture())
            .await
            .unwrap_err();

        assert!(matches!(err, ResultError::SampleNotReady(_)));
        assert!(results.list_for_sample(sample.id()).await.unwrap().is_empty());
        let stored = samples.find_by_id(sample.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SampleStatus::Cancelled);
        assert!(bus.events_of_type("result.recorded.v1").is_empty());
    }

    #[tokio::test]
    async fn target_only_uses_tolerance() {
        let test = TestDefinition::new(TestDraft {
            name: "Density".into(),
            code: "DEN-1".into(),
            specifications: vec![SpecificationDraft {
                parameter: "Density".into(),
                target_value: Some(Decimal::new(100, 2)),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap();
        let f = fixture(vec![test.clone()], Decimal::new(5, 2));
        let sample = received_sample(&f, &[test.id()]).await;

        let near = submit(&f, cmd(sample.id(), test.id(), "1.04")).await.unwrap();
        assert!(near.result.passed());
        let far = submit(&f, cmd(sample.id(), test.id(), "1.06")).await.unwrap();
        assert!(!far.result.passed());
    }

    #[tokio::test]
    async fn qualitative_without_verdict_is_rejected() {
        let test = appearance("APP-1");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let err = submit(&f, cmd(sample.id(), test.id(), "White")).await.unwrap_err();
        assert!(matches!(err, ResultError::ValidationFailed { ref field, .. } if field == "passed"));
    }

    #[tokio::test]
    async fn non_numeric_value_for_numeric_test_is_rejected() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let err = submit(&f, cmd(sample.id(), test.id(), "about 99")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn pending_sample_is_not_ready() {
        let test = assay("AS-01");
        let f = fixture(vec![test.clone()], Decimal::ZERO);
        let sample = sample_with(&[test.id()]);
        f.samples.insert(&sample).await.unwrap();

        let err = submit(&f, cmd(sample.id(), test.id(), "99")).await.unwrap_err();
        assert!(matches!(err, ResultError::SampleNotReady(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn unassigned_test_is_validation_error() {
        let test = assay("AS-01");
        let other = assay("AS-02");
        let f = fixture(vec![test.clone(), other.clone()], Decimal::ZERO);
        let sample = received_sample(&f, &[test.id()]).await;

        let err = submit(&f, cmd(sample.id(), other.id(), "99")).await.unwrap_err();
        assert!(matches!(err, ResultError::TestNotAssigned { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn unknown_sample_and_deleted_test_are_not_found() {
        let test = assay("AS-01");
        let f = fixture(vec![], Decimal::ZERO);

        let err = submit(&f, cmd(SampleId::new(), test.id(), "99")).await.unwrap_err();
        assert!(matches!(err, ResultError::SampleNotFound(_)));

        let sample = received_sample(&f, &[test.id()]).await;
        let err = submit(&f, cmd(sample.id(), test.id(), "99")).await.unwrap_err();
        assert!(matches!(err, ResultError::TestNotFound(_)));
    }
}
