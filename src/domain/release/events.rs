//! QA release domain events.

use serde::{Deserialize, Serialize};

use super::Decision;
use crate::domain::foundation::{
    domain_event, DocumentNumber, EventId, ReleaseId, SampleId, Timestamp,
};
use crate::domain::sample::SourceRef;

/// Published when a completed sample is submitted to QA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSubmitted {
    pub event_id: EventId,
    pub release_id: ReleaseId,
    pub release_number: DocumentNumber,
    pub sample_id: SampleId,
    pub entity: SourceRef,
    pub submitted_at: Timestamp,
}

domain_event!(
    ReleaseSubmitted,
    event_type = "release.submitted.v1",
    aggregate_id = release_id,
    aggregate_type = "Release",
    occurred_at = submitted_at,
    event_id = event_id
);

/// Published when the terminal decision is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDecided {
    pub event_id: EventId,
    pub release_id: ReleaseId,
    pub decision: Decision,
    pub entity: SourceRef,
    pub decided_by: String,
    pub decided_at: Timestamp,
}

domain_event!(
    ReleaseDecided,
    event_type = "release.decided.v1",
    aggregate_id = release_id,
    aggregate_type = "Release",
    occurred_at = decided_at,
    event_id = event_id
);

/// Published once the owning domain confirmed the disposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionDelivered {
    pub event_id: EventId,
    pub release_id: ReleaseId,
    pub entity: SourceRef,
    pub attempts: i32,
    pub delivered_at: Timestamp,
}

domain_event!(
    DispositionDelivered,
    event_type = "release.delivered.v1",
    aggregate_id = release_id,
    aggregate_type = "Release",
    occurred_at = delivered_at,
    event_id = event_id
);
