//! TestResult aggregate - one measurement for one (sample, test) pair.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Evaluation;
use crate::domain::foundation::{ResultId, SampleId, TestId, Timestamp, UserId};

/// What the lab reported for a (sample, test) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSubmission {
    pub parameter: Option<String>,
    pub result_value: String,
    pub unit: Option<String>,
    pub tested_by: UserId,
    pub tested_at: Option<Timestamp>,
}

/// A recorded test result.
///
/// # Invariants
///
/// - at most one result exists per `(sample_id, test_id)`
/// - a re-submission keeps `id`, bumps `revision` and clears the review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    id: ResultId,
    sample_id: SampleId,
    test_id: TestId,
    parameter: Option<String>,
    result_value: String,
    numeric_value: Option<Decimal>,
    unit: Option<String>,
    passed: bool,
    deviation: Option<String>,
    tested_by: UserId,
    tested_at: Timestamp,
    reviewed_by: Option<UserId>,
    reviewed_at: Option<Timestamp>,
    revision: i32,
    recorded_at: Timestamp,
    updated_at: Timestamp,
}

impl TestResult {
    /// Record a freshly evaluated result.
    pub fn record(
        sample_id: SampleId,
        test_id: TestId,
        submission: ResultSubmission,
        evaluation: Evaluation,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: ResultId::new(),
            sample_id,
            test_id,
            parameter: submission.parameter.filter(|p| !p.trim().is_empty()),
            result_value: submission.result_value.trim().to_string(),
            numeric_value: evaluation.numeric_value,
            unit: submission.unit.filter(|u| !u.trim().is_empty()),
            passed: evaluation.passed,
            deviation: evaluation.deviation,
            tested_by: submission.tested_by,
            tested_at: submission.tested_at.unwrap_or(now),
            reviewed_by: None,
            reviewed_at: None,
            revision: 1,
            recorded_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a result from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ResultId,
        sample_id: SampleId,
        test_id: TestId,
        parameter: Option<String>,
        result_value: String,
        numeric_value: Option<Decimal>,
        unit: Option<String>,
        passed: bool,
        deviation: Option<String>,
        tested_by: UserId,
        tested_at: Timestamp,
        reviewed_by: Option<UserId>,
        reviewed_at: Option<Timestamp>,
        revision: i32,
        recorded_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sample_id,
            test_id,
            parameter,
            result_value,
            numeric_value,
            unit,
            passed,
            deviation,
            tested_by,
            tested_at,
            reviewed_by,
            reviewed_at,
            revision,
            recorded_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> ResultId {
        self.id
    }

    pub fn sample_id(&self) -> SampleId {
        self.sample_id
    }

    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn result_value(&self) -> &str {
        &self.result_value
    }

    pub fn numeric_value(&self) -> Option<Decimal> {
        self.numeric_value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn deviation(&self) -> Option<&str> {
        self.deviation.as_deref()
    }

    pub fn tested_by(&self) -> &UserId {
        &self.tested_by
    }

    pub fn tested_at(&self) -> &Timestamp {
        &self.tested_at
    }

    pub fn reviewed_by(&self) -> Option<&UserId> {
        self.reviewed_by.as_ref()
    }

    pub fn reviewed_at(&self) -> Option<&Timestamp> {
        self.reviewed_at.as_ref()
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed_at.is_some()
    }

    /// Number of times this pair has been submitted.
    pub fn revision(&self) -> i32 {
        self.revision
    }

    pub fn recorded_at(&self) -> &Timestamp {
        &self.recorded_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Overwrite this result with a newer submission for the same pair.
    ///
    /// Identity and first-recorded time are kept; any prior review is cleared
    /// so a stale sign-off is never carried forward.
    pub fn supersede(&mut self, newer: TestResult) {
        debug_assert_eq!((self.sample_id, self.test_id), (newer.sample_id, newer.test_id));
        self.parameter = newer.parameter;
        self.result_value = newer.result_value;
        self.numeric_value = newer.numeric_value;
        self.unit = newer.unit;
        self.passed = newer.passed;
        self.deviation = newer.deviation;
        self.tested_by = newer.tested_by;
        self.tested_at = newer.tested_at;
        self.reviewed_by = None;
        self.reviewed_at = None;
        self.revision += 1;
        self.updated_at = newer.updated_at;
    }

    /// Record a reviewer's sign-off. Re-reviewing replaces the reviewer.
    pub fn review(&mut self, reviewer: UserId) {
        let now = Timestamp::now();
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(value: &str) -> ResultSubmission {
        ResultSubmission {
            parameter: Some("Assay".into()),
            result_value: value.into(),
            unit: Some("%".into()),
            tested_by: UserId::new("analyst-1").unwrap(),
            tested_at: None,
        }
    }

    fn evaluation(value: &str, passed: bool) -> Evaluation {
        Evaluation {
            passed,
            numeric_value: value.parse().ok(),
            deviation: None,
        }
    }

    #[test]
    fn record_starts_at_revision_one_unreviewed() {
        let result = TestResult::record(
            SampleId::new(),
            TestId::new(),
            submission(" 99.2 "),
            evaluation("99.2", true),
        );
        assert_eq!(result.revision(), 1);
        assert_eq!(result.result_value(), "99.2");
        assert!(!result.is_reviewed());
    }

    #[test]
    fn supersede_keeps_identity_and_clears_review() {
        let (sample_id, test_id) = (SampleId::new(), TestId::new());
        let mut first = TestResult::record(sample_id, test_id, submission("80"), evaluation("80", false));
        first.review(UserId::new("qc-lead").unwrap());
        let original_id = first.id();

        let retest = TestResult::record(sample_id, test_id, submission("101"), evaluation("101", true));
        first.supersede(retest);

        assert_eq!(first.id(), original_id);
        assert_eq!(first.revision(), 2);
        assert!(first.passed());
        assert_eq!(first.result_value(), "101");
        assert!(first.reviewed_by().is_none());
        assert!(first.reviewed_at().is_none());
    }
}
