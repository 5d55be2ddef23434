//! Sample lifecycle domain events.

use serde::{Deserialize, Serialize};

use super::{SampleStatus, SourceRef};
use crate::domain::foundation::{domain_event, DocumentNumber, EventId, SampleId, Timestamp};

/// Published when a sample is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCreated {
    pub event_id: EventId,
    pub sample_id: SampleId,
    pub sample_number: DocumentNumber,
    pub source: SourceRef,
    pub material_id: String,
    pub test_count: usize,
    pub created_at: Timestamp,
}

domain_event!(
    SampleCreated,
    event_type = "sample.created.v1",
    aggregate_id = sample_id,
    aggregate_type = "Sample",
    occurred_at = created_at,
    event_id = event_id
);

/// Published when the material arrives in the lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleReceived {
    pub event_id: EventId,
    pub sample_id: SampleId,
    pub sample_number: DocumentNumber,
    pub received_at: Timestamp,
}

domain_event!(
    SampleReceived,
    event_type = "sample.received.v1",
    aggregate_id = sample_id,
    aggregate_type = "Sample",
    occurred_at = received_at,
    event_id = event_id
);

/// Published when recomputation moves a sample to a derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleStatusChanged {
    pub event_id: EventId,
    pub sample_id: SampleId,
    pub from: SampleStatus,
    pub to: SampleStatus,
    pub changed_at: Timestamp,
}

domain_event!(
    SampleStatusChanged,
    event_type = "sample.status_changed.v1",
    aggregate_id = sample_id,
    aggregate_type = "Sample",
    occurred_at = changed_at,
    event_id = event_id
);

/// Published when a sample is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCancelled {
    pub event_id: EventId,
    pub sample_id: SampleId,
    pub reason: String,
    pub cancelled_at: Timestamp,
}

domain_event!(
    SampleCancelled,
    event_type = "sample.cancelled.v1",
    aggregate_id = sample_id,
    aggregate_type = "Sample",
    occurred_at = cancelled_at,
    event_id = event_id
);
