//! RecomputeStatusHandler - re-derives a sample's status from its results.
//!
//! This is the only writer of `InTesting` and `Completed`. The write is
//! version-checked; on a stale write the sample and its results are re-read
//! and the status derived again.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, ErrorCode, EventId, SampleId, SerializableDomainEvent, TestId,
};
use crate::domain::sample::{Sample, SampleError, SampleStatusChanged};
use crate::ports::{EventPublisher, ResultRepository, SampleRepository};

/// Attempts before a persistent version conflict is reported.
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct RecomputeStatusCommand {
    /// Sample whose status is re-derived.
    pub sample_id: SampleId,
}

#[derive(Debug, Clone)]
pub struct RecomputeStatusResult {
    /// The sample as stored after recomputation.
    pub sample: Sample,
    /// Present when the status changed.
    pub change: Option<SampleStatusChanged>,
}

pub struct RecomputeStatusHandler {
    samples: Arc<dyn SampleRepository>,
    results: Arc<dyn ResultRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecomputeStatusHandler {
    pub fn new(
        samples: Arc<dyn SampleRepository>,
        results: Arc<dyn ResultRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            samples,
            results,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecomputeStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<RecomputeStatusResult, SampleError> {
        let mut attempt = 1;
        loop {
            let mut sample = self
                .samples
                .find_by_id(cmd.sample_id)
                .await?
                .ok_or_else(|| SampleError::not_found(cmd.sample_id))?;

            let tested: HashSet<TestId> = self
                .results
                .list_for_sample(cmd.sample_id)
                .await?
                .iter()
                .map(|r| r.test_id())
                .collect();

            let Some(previous) = sample.recompute(&tested)? else {
                return Ok(RecomputeStatusResult {
                    sample,
                    change: None,
                });
            };

            match self.samples.update(&sample).await {
                Ok(()) => {
                    tracing::info!(
                        sample_id = %sample.id(),
                        from = %previous,
                        to = %sample.status(),
                        "sample status recomputed"
                    );
                    let event = SampleStatusChanged {
                        event_id: EventId::new(),
                        sample_id: sample.id(),
                        from: previous,
                        to: sample.status(),
                        changed_at: *sample.updated_at(),
                    };
                    let envelope = event
                        .to_envelope()
                        .with_correlation_id(metadata.correlation_id())
                        .with_user_id(metadata.user_id.to_string());
                    self.event_publisher.publish(envelope).await?;

                    return Ok(RecomputeStatusResult {
                        sample,
                        change: Some(event),
                    });
                }
                Err(err) if err.code == ErrorCode::ConcurrentModification => {
                    if attempt >= MAX_ATTEMPTS {
                        tracing::warn!(
                            sample_id = %cmd.sample_id,
                            attempts = attempt,
                            "status recompute kept losing version race"
                        );
                        return Err(SampleError::ConcurrentModification(cmd.sample_id));
                    }
                    tracing::warn!(
                        sample_id = %cmd.sample_id,
                        attempt,
                        "stale sample write, re-deriving status"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
