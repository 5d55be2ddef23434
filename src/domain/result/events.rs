//! Result evaluator domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, ResultId, SampleId, TestId, Timestamp};

/// Published after a result is written (first submission or retest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecorded {
    pub event_id: EventId,
    pub result_id: ResultId,
    pub sample_id: SampleId,
    pub test_id: TestId,
    pub passed: bool,
    pub revision: i32,
    pub recorded_at: Timestamp,
}

domain_event!(
    ResultRecorded,
    event_type = "result.recorded.v1",
    aggregate_id = result_id,
    aggregate_type = "Result",
    occurred_at = recorded_at,
    event_id = event_id
);
