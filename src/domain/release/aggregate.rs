//! Release aggregate - the QA disposition gate.
//!
//! A release references QC data only by id and snapshot. Once its decision is
//! terminal the record is immutable apart from delivery bookkeeping.

use serde::{Deserialize, Serialize};

use super::{ChecklistItem, Decision, DeliveryStatus, QcResultSnapshot, ReleaseStatus};
use crate::domain::foundation::{
    ChecklistItemId, DocumentNumber, DomainError, ErrorCode, ReleaseId, SampleId, StateMachine,
    Timestamp, UserId,
};
use crate::domain::sample::{SourceRef, SourceType};

/// Decided disposition to forward to the domain that owns the entity.
///
/// Receivers deduplicate on `release_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispositionEvent {
    pub release_id: ReleaseId,
    pub release_number: DocumentNumber,
    pub entity_type: SourceType,
    pub entity_id: String,
    pub decision: Decision,
    pub decided_at: Timestamp,
}

/// Sample facts copied onto a release at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSample {
    pub sample_id: SampleId,
    pub sample_number: DocumentNumber,
    pub entity: SourceRef,
    pub material_name: String,
    pub batch_number: Option<String>,
}

/// Release aggregate.
///
/// # Invariants
///
/// - `decision` moves from `Pending` to a terminal value exactly once
/// - `status == Decided` iff `decision` is terminal
/// - checklist and snapshot never change after the decision
/// - `delivery_status` is `NotRequired` until decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    id: ReleaseId,
    release_number: DocumentNumber,
    sample_id: SampleId,
    sample_number: DocumentNumber,
    entity: SourceRef,
    material_name: String,
    batch_number: Option<String>,
    status: ReleaseStatus,
    decision: Decision,
    checklist: Vec<ChecklistItem>,
    results: Vec<QcResultSnapshot>,
    remarks: Option<String>,
    submitted_by: UserId,
    submitted_at: Timestamp,
    reviewed_by: Option<UserId>,
    reviewed_at: Option<Timestamp>,
    decided_by: Option<UserId>,
    decided_at: Option<Timestamp>,
    due_date: Timestamp,
    delivery_status: DeliveryStatus,
    delivery_attempts: i32,
    last_delivery_error: Option<String>,
    delivered_at: Option<Timestamp>,
    version: i64,
    updated_at: Timestamp,
}

impl Release {
    /// Open a release for a completed sample.
    pub fn submit(
        id: ReleaseId,
        release_number: DocumentNumber,
        sample: SubmittedSample,
        results: Vec<QcResultSnapshot>,
        checklist: Vec<ChecklistItem>,
        submitted_by: UserId,
        review_window_days: i64,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            release_number,
            sample_id: sample.sample_id,
            sample_number: sample.sample_number,
            entity: sample.entity,
            material_name: sample.material_name,
            batch_number: sample.batch_number,
            status: ReleaseStatus::Pending,
            decision: Decision::Pending,
            checklist,
            results,
            remarks: None,
            submitted_by,
            submitted_at: now,
            reviewed_by: None,
            reviewed_at: None,
            decided_by: None,
            decided_at: None,
            due_date: now.plus_days(review_window_days),
            delivery_status: DeliveryStatus::NotRequired,
            delivery_attempts: 0,
            last_delivery_error: None,
            delivered_at: None,
            version: 1,
            updated_at: now,
        }
    }

    /// Reconstitute a release from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ReleaseId,
        release_number: DocumentNumber,
        sample_id: SampleId,
        sample_number: DocumentNumber,
        entity: SourceRef,
        material_name: String,
        batch_number: Option<String>,
        status: ReleaseStatus,
        decision: Decision,
        checklist: Vec<ChecklistItem>,
        results: Vec<QcResultSnapshot>,
        remarks: Option<String>,
        submitted_by: UserId,
        submitted_at: Timestamp,
        reviewed_by: Option<UserId>,
        reviewed_at: Option<Timestamp>,
        decided_by: Option<UserId>,
        decided_at: Option<Timestamp>,
        due_date: Timestamp,
        delivery_status: DeliveryStatus,
        delivery_attempts: i32,
        last_delivery_error: Option<String>,
        delivered_at: Option<Timestamp>,
        version: i64,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            release_number,
            sample_id,
            sample_number,
            entity,
            material_name,
            batch_number,
            status,
            decision,
            checklist,
            results,
            remarks,
            submitted_by,
            submitted_at,
            reviewed_by,
            reviewed_at,
            decided_by,
            decided_at,
            due_date,
            delivery_status,
            delivery_attempts,
            last_delivery_error,
            delivered_at,
            version,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> ReleaseId {
        self.id
    }

    pub fn release_number(&self) -> &DocumentNumber {
        &self.release_number
    }

    pub fn sample_id(&self) -> SampleId {
        self.sample_id
    }

    pub fn sample_number(&self) -> &DocumentNumber {
        &self.sample_number
    }

    /// The goods-receipt line, batch or order this disposition is about.
    pub fn entity(&self) -> &SourceRef {
        &self.entity
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn batch_number(&self) -> Option<&str> {
        self.batch_number.as_deref()
    }

    pub fn status(&self) -> ReleaseStatus {
        self.status
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    pub fn results(&self) -> &[QcResultSnapshot] {
        &self.results
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn submitted_by(&self) -> &UserId {
        &self.submitted_by
    }

    pub fn submitted_at(&self) -> &Timestamp {
        &self.submitted_at
    }

    pub fn reviewed_by(&self) -> Option<&UserId> {
        self.reviewed_by.as_ref()
    }

    pub fn reviewed_at(&self) -> Option<&Timestamp> {
        self.reviewed_at.as_ref()
    }

    pub fn decided_by(&self) -> Option<&UserId> {
        self.decided_by.as_ref()
    }

    pub fn decided_at(&self) -> Option<&Timestamp> {
        self.decided_at.as_ref()
    }

    pub fn due_date(&self) -> &Timestamp {
        &self.due_date
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    pub fn delivery_attempts(&self) -> i32 {
        self.delivery_attempts
    }

    pub fn last_delivery_error(&self) -> Option<&str> {
        self.last_delivery_error.as_deref()
    }

    pub fn delivered_at(&self) -> Option<&Timestamp> {
        self.delivered_at.as_ref()
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Required checklist categories still unchecked.
    pub fn unchecked_required(&self) -> Vec<&str> {
        self.checklist
            .iter()
            .filter(|item| item.is_blocking())
            .map(|item| item.category.as_str())
            .collect()
    }

    /// Snapshot results that did not pass.
    pub fn failed_results(&self) -> Vec<&QcResultSnapshot> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// The disposition to deliver, once decided.
    pub fn disposition_event(&self) -> Option<DispositionEvent> {
        match (self.decision.is_terminal(), self.decided_at) {
            (true, Some(decided_at)) => Some(DispositionEvent {
                release_id: self.id,
                release_number: self.release_number.clone(),
                entity_type: self.entity.source_type,
                entity_id: self.entity.source_id.clone(),
                decision: self.decision,
                decided_at,
            }),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Review
    // ─────────────────────────────────────────────────────────────────────────

    /// Flip one checklist flag. The first update marks the release reviewed.
    ///
    /// # Errors
    ///
    /// - `DecisionAlreadyRecorded` once decided
    /// - `ChecklistItemNotFound` for an unknown item
    pub fn update_checklist(
        &mut self,
        item_id: ChecklistItemId,
        checked: bool,
        by: &UserId,
    ) -> Result<(), DomainError> {
        self.ensure_undecided()?;
        let now = Timestamp::now();
        let item = self
            .checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ChecklistItemNotFound,
                    format!("Checklist item {} not found on {}", item_id, self.release_number),
                )
            })?;
        item.set_checked(checked, by, now);

        if self.status == ReleaseStatus::Pending {
            self.status = self.status.transition_to(ReleaseStatus::Reviewed)?;
        }
        self.reviewed_by = Some(by.clone());
        self.reviewed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Record the terminal decision.
    ///
    /// `Release` requires every required checklist item checked and every
    /// snapshot result passed; `Reject` and `Hold` are always permitted.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a `Pending` decision or an unmet release gate
    /// - `DecisionAlreadyRecorded` if already decided
    pub fn decide(
        &mut self,
        decision: Decision,
        remarks: Option<String>,
        decided_by: UserId,
    ) -> Result<DispositionEvent, DomainError> {
        self.ensure_undecided()?;
        if !decision.is_terminal() {
            return Err(DomainError::validation(
                "decision",
                "Decision must be release, reject or hold",
            ));
        }
        if decision == Decision::Release {
            let unchecked = self.unchecked_required();
            if !unchecked.is_empty() {
                return Err(DomainError::validation(
                    "checklist",
                    format!("Required checklist items unchecked: {}", unchecked.join(", ")),
                ));
            }
            let failed: Vec<&str> = self
                .failed_results()
                .into_iter()
                .map(|r| r.test_code.as_str())
                .collect();
            if !failed.is_empty() {
                return Err(DomainError::validation(
                    "results",
                    format!("Cannot release with failed results: {}", failed.join(", ")),
                ));
            }
        }

        let now = Timestamp::now();
        self.status = self.status.transition_to(ReleaseStatus::Decided)?;
        self.decision = decision;
        self.remarks = remarks.filter(|r| !r.trim().is_empty());
        self.decided_by = Some(decided_by);
        self.decided_at = Some(now);
        self.delivery_status = DeliveryStatus::Pending;
        self.touch(now);

        self.disposition_event().ok_or_else(|| {
            DomainError::new(ErrorCode::InternalError, "Decided release has no disposition")
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delivery bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// The owning domain confirmed receipt.
    pub fn mark_delivered(&mut self) {
        let now = Timestamp::now();
        self.delivery_status = DeliveryStatus::Delivered;
        self.delivery_attempts += 1;
        self.last_delivery_error = None;
        self.delivered_at = Some(now);
        self.updated_at = now;
    }

    /// A delivery attempt failed or its outcome is unknown; stays pending.
    pub fn record_delivery_failure(&mut self, error: impl Into<String>) {
        self.delivery_attempts += 1;
        self.last_delivery_error = Some(error.into());
        self.updated_at = Timestamp::now();
    }

    fn ensure_undecided(&self) -> Result<(), DomainError> {
        if self.decision.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::DecisionAlreadyRecorded,
                format!(
                    "Release {} is already decided ({})",
                    self.release_number, self.decision
                ),
            ));
        }
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
    use crate::domain::foundation::{ResultId, TestId};

    pub fn snapshot(code: &str, passed: bool) -> QcResultSnapshot {
        QcResultSnapshot {
            result_id: ResultId::new(),
            test_id: TestId::new(),
            test_code: code.into(),
            test_name: code.into(),
            parameter: None,
            result_value: "100".into(),
            numeric_value: Some(rust_decimal::Decimal::new(100, 0)),
            unit: Some("%".into()),
            passed,
            deviation: None,
            tested_by: UserId::new("analyst-1").unwrap(),
            tested_at: Timestamp::now(),
        }
    }

    pub fn release_with(results: Vec<QcResultSnapshot>, checklist: Vec<ChecklistItem>) -> Release {
        release_for(SampleId::new(), results, checklist)
    }

    pub fn release_for(
        sample_id: SampleId,
        results: Vec<QcResultSnapshot>,
        checklist: Vec<ChecklistItem>,
    ) -> Release {
        Release::submit(
            ReleaseId::new(),
            DocumentNumber::release(2026, 1),
            SubmittedSample {
                sample_id,
                sample_number: DocumentNumber::sample(2026, 1),
                entity: SourceRef::new(SourceType::GoodsReceipt, "GRI-9", None).unwrap(),
                material_name: "Lactose Monohydrate".into(),
                batch_number: Some("B-1".into()),
            },
            results,
            checklist,
            UserId::new("analyst-1").unwrap(),
            5,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{release_with, snapshot};
    use super::*;
    use crate::domain::foundation::ErrorKind;

    fn reviewer() -> UserId {
        UserId::new("qa-reviewer").unwrap()
    }

    fn standard_checklist() -> Vec<ChecklistItem> {
        vec![
            ChecklistItem::new("Documentation", true),
            ChecklistItem::new("Visual Inspection", true),
            ChecklistItem::new("Retain Sample Stored", false),
        ]
    }

    fn check_required(release: &mut Release) {
        let ids: Vec<_> = release
            .checklist()
            .iter()
            .filter(|i| i.is_required)
            .map(|i| i.id)
            .collect();
        for id in ids {
            release.update_checklist(id, true, &reviewer()).unwrap();
        }
    }

    #[test]
    fn submitted_release_is_pending() {
        let release = release_with(vec![snapshot("AS-01", true)], standard_checklist());
        assert_eq!(release.status(), ReleaseStatus::Pending);
        assert_eq!(release.decision(), Decision::Pending);
        assert_eq!(release.delivery_status(), DeliveryStatus::NotRequired);
        assert!(release.disposition_event().is_none());
        assert_eq!(
            release.due_date().as_datetime().date_naive(),
            release.submitted_at().plus_days(5).as_datetime().date_naive()
        );
    }

    #[test]
    fn first_checklist_update_marks_reviewed() {
        let mut release = release_with(vec![snapshot("AS-01", true)], standard_checklist());
        let item = release.checklist()[0].id;
        release.update_checklist(item, true, &reviewer()).unwrap();

        assert_eq!(release.status(), ReleaseStatus::Reviewed);
        assert_eq!(release.reviewed_by(), Some(&reviewer()));
        assert!(release.checklist()[0].is_checked);
        assert_eq!(release.version(), 2);
    }

    #[test]
    fn unchecking_clears_attestation() {
        let mut release = release_with(vec![], standard_checklist());
        let item = release.checklist()[0].id;
        release.update_checklist(item, true, &reviewer()).unwrap();
        release.update_checklist(item, false, &reviewer()).unwrap();
        assert!(!release.checklist()[0].is_checked);
        assert!(release.checklist()[0].checked_by.is_none());
    }

    #[test]
    fn unknown_checklist_item_is_not_found() {
        let mut release = release_with(vec![], standard_checklist());
        let err = release
            .update_checklist(ChecklistItemId::new(), true, &reviewer())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn release_requires_required_items_checked() {
        let mut release = release_with(vec![snapshot("AS-01", true)], standard_checklist());
        let err = release.decide(Decision::Release, None, reviewer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message.contains("Documentation"));
        assert_eq!(release.decision(), Decision::Pending);
    }

    #[test]
    fn optional_items_do_not_block_release() {
        let mut release = release_with(vec![snapshot("AS-01", true)], standard_checklist());
        check_required(&mut release);
        let event = release
            .decide(Decision::Release, Some("All good".into()), reviewer())
            .unwrap();
        assert_eq!(event.decision, Decision::Release);
        assert_eq!(event.entity_type, SourceType::GoodsReceipt);
        assert_eq!(event.entity_id, "GRI-9");
        assert_eq!(release.status(), ReleaseStatus::Decided);
        assert_eq!(release.delivery_status(), DeliveryStatus::Pending);
    }

    #[test]
    fn release_requires_all_results_passed() {
        let mut release = release_with(
            vec![snapshot("AS-01", true), snapshot("KF-01", false)],
            standard_checklist(),
        );
        check_required(&mut release);
        let err = release.decide(Decision::Release, None, reviewer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message.contains("KF-01"));
    }

    #[test]
    fn reject_and_hold_are_always_permitted() {
        for decision in [Decision::Reject, Decision::Hold] {
            let mut release = release_with(vec![snapshot("AS-01", false)], standard_checklist());
            let event = release.decide(decision, None, reviewer()).unwrap();
            assert_eq!(event.decision, decision);
        }
    }

    #[test]
    fn pending_is_not_a_decision() {
        let mut release = release_with(vec![], vec![]);
        let err = release.decide(Decision::Pending, None, reviewer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn decided_release_is_immutable() {
        let mut release = release_with(vec![snapshot("AS-01", true)], standard_checklist());
        release.decide(Decision::Hold, None, reviewer()).unwrap();

        let item = release.checklist()[0].id;
        let err = release.update_checklist(item, true, &reviewer()).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecisionAlreadyRecorded);
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = release.decide(Decision::Reject, None, reviewer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(release.decision(), Decision::Hold);
    }

    #[test]
    fn delivery_bookkeeping_counts_attempts() {
        let mut release = release_with(vec![], vec![]);
        release.decide(Decision::Reject, None, reviewer()).unwrap();
        release.record_delivery_failure("inventory timed out");
        assert_eq!(release.delivery_status(), DeliveryStatus::Pending);
        assert_eq!(release.last_delivery_error(), Some("inventory timed out"));

        release.mark_delivered();
        assert_eq!(release.delivery_status(), DeliveryStatus::Delivered);
        assert_eq!(release.delivery_attempts(), 2);
        assert!(release.last_delivery_error().is_none());
    }
}
