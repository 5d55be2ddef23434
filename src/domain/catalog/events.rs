//! Test catalog domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, TestId, Timestamp};

/// Published when a test definition is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCreated {
    pub event_id: EventId,
    pub test_id: TestId,
    pub code: String,
    pub name: String,
    pub category: String,
    pub specification_count: usize,
    pub created_at: Timestamp,
}

domain_event!(
    TestCreated,
    event_type = "test.created.v1",
    aggregate_id = test_id,
    aggregate_type = "Test",
    occurred_at = created_at,
    event_id = event_id
);

/// Published when a test definition is updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUpdated {
    pub event_id: EventId,
    pub test_id: TestId,
    pub code: String,
    pub specifications_replaced: bool,
    pub updated_at: Timestamp,
}

domain_event!(
    TestUpdated,
    event_type = "test.updated.v1",
    aggregate_id = test_id,
    aggregate_type = "Test",
    occurred_at = updated_at,
    event_id = event_id
);

/// Published when a test definition is hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDeleted {
    pub event_id: EventId,
    pub test_id: TestId,
    pub code: String,
    pub deleted_at: Timestamp,
}

domain_event!(
    TestDeleted,
    event_type = "test.deleted.v1",
    aggregate_id = test_id,
    aggregate_type = "Test",
    occurred_at = deleted_at,
    event_id = event_id
);
