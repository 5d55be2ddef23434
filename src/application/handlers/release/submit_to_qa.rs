//! SubmitToQaHandler - opens the QA release for a completed sample.
//!
//! Idempotent per sample: a second submission returns the existing release.
//! Concurrent first submissions are resolved by the store's uniqueness
//! guarantee, so exactly one release is ever created.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, DocumentNumber, EventId, ReleaseId, SampleId, SerializableDomainEvent,
    Timestamp, UserId,
};
use crate::domain::release::{
    ChecklistItem, QcResultSnapshot, Release, ReleaseError, ReleaseSubmitted, SubmittedSample,
};
use crate::domain::result::TestResult;
use crate::domain::sample::{Sample, SampleStatus};
use crate::ports::{EventPublisher, InsertOutcome, QcReader, ReleaseRepository};

/// Checklist seed and review window applied to new releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPolicy {
    pub required_checklist: Vec<String>,
    pub optional_checklist: Vec<String>,
    pub review_window_days: i64,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            required_checklist: vec![
                "Documentation".to_string(),
                "Visual Inspection".to_string(),
                "COA Attached".to_string(),
            ],
            optional_checklist: Vec::new(),
            review_window_days: 5,
        }
    }
}

impl SubmissionPolicy {
    fn checklist(&self) -> Vec<ChecklistItem> {
        self.required_checklist
            .iter()
            .map(|category| ChecklistItem::new(category.as_str(), true))
            .chain(
                self.optional_checklist
                    .iter()
                    .map(|category| ChecklistItem::new(category.as_str(), false)),
            )
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SubmitToQaCommand {
    /// Completed sample to put under review.
    pub sample_id: SampleId,
    /// QC operator handing the sample over.
    pub submitted_by: UserId,
}

#[derive(Debug, Clone)]
pub struct SubmitToQaResult {
    /// The new release, or the existing one for the sample.
    pub release: Release,
    /// False when an existing release was returned.
    pub created: bool,
}

pub struct SubmitToQaHandler {
    releases: Arc<dyn ReleaseRepository>,
    qc: Arc<dyn QcReader>,
    event_publisher: Arc<dyn EventPublisher>,
    policy: SubmissionPolicy,
}

impl SubmitToQaHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        qc: Arc<dyn QcReader>,
        event_publisher: Arc<dyn EventPublisher>,
        policy: SubmissionPolicy,
    ) -> Self {
        Self {
            releases,
            qc,
            event_publisher,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitToQaCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitToQaResult, ReleaseError> {
        // 1. Already submitted?
        if let Some(release) = self.releases.find_by_sample(cmd.sample_id).await? {
            return Ok(SubmitToQaResult {
                release,
                created: false,
            });
        }

        // 2. Re-read authoritative QC state
        let sample = self
            .qc
            .get_sample(cmd.sample_id, &metadata)
            .await?
            .ok_or(ReleaseError::SampleNotFound(cmd.sample_id))?;

        if sample.status() != SampleStatus::Completed {
            return Err(ReleaseError::SampleNotCompleted(format!(
                "Sample {} is {}; only completed samples can be submitted to QA",
                sample.sample_number(),
                sample.status()
            )));
        }

        let results = self.qc.list_results(cmd.sample_id, &metadata).await?;

        // 3. Build the release
        let year = Timestamp::now().year();
        let sequence = self.releases.next_sequence(year).await?;
        let release = Release::submit(
            ReleaseId::new(),
            DocumentNumber::release(year, sequence),
            SubmittedSample {
                sample_id: sample.id(),
                sample_number: sample.sample_number().clone(),
                entity: sample.source().clone(),
                material_name: sample.material().material_name.clone(),
                batch_number: sample.batch_number().map(str::to_string),
            },
            snapshot(&sample, results),
            self.policy.checklist(),
            cmd.submitted_by,
            self.policy.review_window_days,
        );

        // 4. Insert unless a concurrent submission won
        match self.releases.insert_unique(&release).await? {
            InsertOutcome::Existing(existing) => {
                tracing::info!(
                    sample_id = %cmd.sample_id,
                    release_id = %existing.id(),
                    "concurrent submission resolved to existing release"
                );
                return Ok(SubmitToQaResult {
                    release: existing,
                    created: false,
                });
            }
            InsertOutcome::Inserted => {}
        }

        tracing::info!(
            release_id = %release.id(),
            release_number = %release.release_number(),
            sample_number = %release.sample_number(),
            results = release.results().len(),
            "release submitted"
        );

        let event = ReleaseSubmitted {
            event_id: EventId::new(),
            release_id: release.id(),
            release_number: release.release_number().clone(),
            sample_id: release.sample_id(),
            entity: release.entity().clone(),
            submitted_at: *release.submitted_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        Ok(SubmitToQaResult {
            release,
            created: true,
        })
    }
}

/// Freeze the results with the test name/code cached on the sample.
fn snapshot(sample: &Sample, results: Vec<TestResult>) -> Vec<QcResultSnapshot> {
    results
        .into_iter()
        .map(|result| {
            let assigned = sample
                .assigned_tests()
                .iter()
                .find(|t| t.test_id == result.test_id());
            QcResultSnapshot {
                result_id: result.id(),
                test_id: result.test_id(),
                test_code: assigned.map(|t| t.test_code.clone()).unwrap_or_default(),
                test_name: assigned.map(|t| t.test_name.clone()).unwrap_or_default(),
                parameter: result.parameter().map(str::to_string),
                result_value: result.result_value().to_string(),
                numeric_value: result.numeric_value(),
                unit: result.unit().map(str::to_string),
                passed: result.passed(),
                deviation: result.deviation().map(str::to_string),
                tested_by: result.tested_by().clone(),
                tested_at: *result.tested_at(),
            }
        })
        .collect()
}
