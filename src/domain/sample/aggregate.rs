//! Sample aggregate entity.
//!
//! A sample is a physical specimen drawn from a received or produced lot. It
//! owns its assigned-test records; results live with the result evaluator and
//! are related only by `sample_id`.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{SamplePriority, SampleStatus, SourceRef};
use crate::domain::foundation::{
    DocumentNumber, DomainError, ErrorCode, SampleId, StateMachine, TestId, Timestamp, UserId,
};

/// Material identity copied onto the sample at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInfo {
    pub material_id: String,
    pub material_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_code: Option<String>,
}

/// A catalog test assigned to a sample.
///
/// Name and code are denormalized at assignment time so later catalog edits
/// do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTest {
    pub test_id: TestId,
    pub test_name: String,
    pub test_code: String,
    pub assigned_at: Timestamp,
}

impl AssignedTest {
    pub fn new(test_id: TestId, test_name: impl Into<String>, test_code: impl Into<String>) -> Self {
        Self {
            test_id,
            test_name: test_name.into(),
            test_code: test_code.into(),
            assigned_at: Timestamp::now(),
        }
    }
}

/// Everything needed to open a new sample, minus its number and tests.
#[derive(Debug, Clone)]
pub struct SampleDraft {
    pub source: SourceRef,
    pub material: MaterialInfo,
    pub batch_number: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub priority: SamplePriority,
    pub assigned_to: Option<UserId>,
    pub requested_by: UserId,
    pub due_date: Option<Timestamp>,
}

/// Partial update of the operational fields of a sample.
///
/// Unknown keys, including `status`, are rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SamplePatch {
    pub priority: Option<SamplePriority>,
    pub assigned_to: Option<String>,
    pub due_date: Option<Timestamp>,
}

impl SamplePatch {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.assigned_to.is_none() && self.due_date.is_none()
    }
}

/// Sample aggregate.
///
/// # Invariants
///
/// - at least one test is assigned; no test is assigned twice
/// - `status` changes only through `receive`, `cancel` and `recompute`
/// - `version` increases by one with every persisted mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    id: SampleId,
    sample_number: DocumentNumber,
    source: SourceRef,
    material: MaterialInfo,
    batch_number: Option<String>,
    quantity: Decimal,
    unit: String,
    priority: SamplePriority,
    status: SampleStatus,
    assigned_to: Option<UserId>,
    requested_by: UserId,
    requested_at: Timestamp,
    due_date: Option<Timestamp>,
    received_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    cancellation_reason: Option<String>,
    assigned_tests: Vec<AssignedTest>,
    version: i64,
    updated_at: Timestamp,
}

impl Sample {
    /// Open a new sample in `Pending`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if no tests are given, the material is unnamed,
    ///   or the quantity is not positive
    pub fn new(
        id: SampleId,
        sample_number: DocumentNumber,
        draft: SampleDraft,
        tests: Vec<AssignedTest>,
    ) -> Result<Self, DomainError> {
        if tests.is_empty() {
            return Err(DomainError::validation(
                "testIds",
                "At least one test must be assigned",
            ));
        }
        if draft.material.material_id.trim().is_empty() {
            return Err(DomainError::validation("materialId", "Material id is required"));
        }
        if draft.material.material_name.trim().is_empty() {
            return Err(DomainError::validation(
                "materialName",
                "Material name is required",
            ));
        }
        if draft.quantity <= Decimal::ZERO {
            return Err(DomainError::validation(
                "quantity",
                format!("Quantity must be positive, got {}", draft.quantity),
            ));
        }
        let unit = draft.unit.trim().to_string();
        if unit.is_empty() {
            return Err(DomainError::validation("unit", "Unit is required"));
        }

        let mut seen = HashSet::new();
        let assigned_tests = tests
            .into_iter()
            .filter(|t| seen.insert(t.test_id))
            .collect();

        let now = Timestamp::now();
        Ok(Self {
            id,
            sample_number,
            source: draft.source,
            material: draft.material,
            batch_number: draft.batch_number.filter(|b| !b.trim().is_empty()),
            quantity: draft.quantity,
            unit,
            priority: draft.priority,
            status: SampleStatus::Pending,
            assigned_to: draft.assigned_to,
            requested_by: draft.requested_by,
            requested_at: now,
            due_date: draft.due_date,
            received_at: None,
            completed_at: None,
            cancellation_reason: None,
            assigned_tests,
            version: 1,
            updated_at: now,
        })
    }

    /// Reconstitute a sample from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SampleId,
        sample_number: DocumentNumber,
        source: SourceRef,
        material: MaterialInfo,
        batch_number: Option<String>,
        quantity: Decimal,
        unit: String,
        priority: SamplePriority,
        status: SampleStatus,
        assigned_to: Option<UserId>,
        requested_by: UserId,
        requested_at: Timestamp,
        due_date: Option<Timestamp>,
        received_at: Option<Timestamp>,
        completed_at: Option<Timestamp>,
        cancellation_reason: Option<String>,
        assigned_tests: Vec<AssignedTest>,
        version: i64,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sample_number,
            source,
            material,
            batch_number,
            quantity,
            unit,
            priority,
            status,
            assigned_to,
            requested_by,
            requested_at,
            due_date,
            received_at,
            completed_at,
            cancellation_reason,
            assigned_tests,
            version,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SampleId {
        self.id
    }

    pub fn sample_number(&self) -> &DocumentNumber {
        &self.sample_number
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn material(&self) -> &MaterialInfo {
        &self.material
    }

    pub fn batch_number(&self) -> Option<&str> {
        self.batch_number.as_deref()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn priority(&self) -> SamplePriority {
        self.priority
    }

    pub fn status(&self) -> SampleStatus {
        self.status
    }

    pub fn assigned_to(&self) -> Option<&UserId> {
        self.assigned_to.as_ref()
    }

    pub fn requested_by(&self) -> &UserId {
        &self.requested_by
    }

    pub fn requested_at(&self) -> &Timestamp {
        &self.requested_at
    }

    pub fn due_date(&self) -> Option<&Timestamp> {
        self.due_date.as_ref()
    }

    pub fn received_at(&self) -> Option<&Timestamp> {
        self.received_at.as_ref()
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn assigned_tests(&self) -> &[AssignedTest] {
        &self.assigned_tests
    }

    /// Optimistic-concurrency counter.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// True when the test is assigned to this sample.
    pub fn has_test(&self, test_id: TestId) -> bool {
        self.assigned_tests.iter().any(|t| t.test_id == test_id)
    }

    pub fn assigned_test_ids(&self) -> Vec<TestId> {
        self.assigned_tests.iter().map(|t| t.test_id).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Record physical receipt in the lab.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the sample is `Pending`
    pub fn receive(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(SampleStatus::Received)?;
        let now = Timestamp::now();
        self.received_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Add further tests. Already-assigned ids are skipped; returns the ids
    /// actually added.
    ///
    /// # Errors
    ///
    /// - `TestsLocked` once testing has begun
    pub fn assign_tests(&mut self, tests: Vec<AssignedTest>) -> Result<Vec<TestId>, DomainError> {
        if !self.status.accepts_test_assignment() {
            return Err(DomainError::new(
                ErrorCode::TestsLocked,
                format!(
                    "Sample {} is {}; tests are locked once testing begins",
                    self.sample_number, self.status
                ),
            ));
        }

        let mut added = Vec::new();
        for test in tests {
            if !self.has_test(test.test_id) {
                added.push(test.test_id);
                self.assigned_tests.push(test);
            }
        }
        if !added.is_empty() {
            self.touch(Timestamp::now());
        }
        Ok(added)
    }

    /// Status implied by the set of tests that have a recorded result.
    ///
    /// Results for tests not assigned to the sample are ignored. A sample
    /// with no relevant results stays where it is.
    pub fn derive_status(&self, tests_with_results: &HashSet<TestId>) -> SampleStatus {
        if !self.status.accepts_results() {
            return self.status;
        }
        let recorded = self
            .assigned_tests
            .iter()
            .filter(|t| tests_with_results.contains(&t.test_id))
            .count();
        if recorded == 0 {
            self.status
        } else if recorded == self.assigned_tests.len() {
            SampleStatus::Completed
        } else {
            SampleStatus::InTesting
        }
    }

    /// Re-derive status from the full result set.
    ///
    /// Returns the previous status when it changed.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the derived status is unreachable
    pub fn recompute(
        &mut self,
        tests_with_results: &HashSet<TestId>,
    ) -> Result<Option<SampleStatus>, DomainError> {
        let target = self.derive_status(tests_with_results);
        if target == self.status {
            return Ok(None);
        }
        let previous = self.status;
        self.status = self.status.transition_to(target)?;
        let now = Timestamp::now();
        if target == SampleStatus::Completed {
            self.completed_at = Some(now);
        }
        self.touch(now);
        Ok(Some(previous))
    }

    /// Cancel a sample that has not produced any results.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the reason is blank
    /// - `InvalidStateTransition` if the sample is past `Received` or a
    ///   result already exists
    pub fn cancel(&mut self, reason: &str, has_results: bool) -> Result<(), DomainError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason", "Cancellation reason is required"));
        }
        if has_results {
            return Err(DomainError::invalid_transition(format!(
                "Sample {} already has recorded results",
                self.sample_number
            )));
        }
        self.status = self.status.transition_to(SampleStatus::Cancelled)?;
        self.cancellation_reason = Some(reason.to_string());
        self.touch(Timestamp::now());
        Ok(())
    }

    /// Apply an operational patch.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` on a completed or cancelled sample
    /// - `ValidationFailed` for a blank assignee
    pub fn apply_patch(&mut self, patch: SamplePatch) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition(format!(
                "Sample {} is {} and can no longer be edited",
                self.sample_number, self.status
            )));
        }
        if patch.is_empty() {
            return Ok(());
        }
        let assigned_to = patch
            .assigned_to
            .map(UserId::new)
            .transpose()
            .map_err(DomainError::from)?;

        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if assigned_to.is_some() {
            self.assigned_to = assigned_to;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        self.touch(Timestamp::now());
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.version += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::sample::SourceType;

    pub fn draft() -> SampleDraft {
        SampleDraft {
            source: SourceRef::new(SourceType::GoodsReceipt, "GRI-1", Some("GR-100/1".into()))
                .unwrap(),
            material: MaterialInfo {
                material_id: "MAT-1".into(),
                material_name: "Lactose Monohydrate".into(),
                material_code: Some("LAC".into()),
            },
            batch_number: Some("B-2026-01".into()),
            quantity: Decimal::new(250, 0),
            unit: "g".into(),
            priority: SamplePriority::Normal,
            assigned_to: None,
            requested_by: UserId::new("analyst-1").unwrap(),
            due_date: None,
        }
    }

    pub fn sample_with(tests: &[TestId]) -> Sample {
        let assigned = tests
            .iter()
            .map(|id| AssignedTest::new(*id, "Assay", "AS-01"))
            .collect();
        Sample::new(SampleId::new(), DocumentNumber::sample(2026, 1), draft(), assigned).unwrap()
    }
}
