//! Checklist items and QC result snapshots embedded in a release.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChecklistItemId, ResultId, TestId, Timestamp, UserId};

/// A manual attestation the reviewer ticks off (e.g. "COA Attached").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub category: String,
    pub is_required: bool,
    pub is_checked: bool,
    pub checked_by: Option<UserId>,
    pub checked_at: Option<Timestamp>,
}

impl ChecklistItem {
    pub fn new(category: impl Into<String>, is_required: bool) -> Self {
        Self {
            id: ChecklistItemId::new(),
            category: category.into(),
            is_required,
            is_checked: false,
            checked_by: None,
            checked_at: None,
        }
    }

    pub(super) fn set_checked(&mut self, checked: bool, by: &UserId, at: Timestamp) {
        self.is_checked = checked;
        if checked {
            self.checked_by = Some(by.clone());
            self.checked_at = Some(at);
        } else {
            self.checked_by = None;
            self.checked_at = None;
        }
    }

    /// Required and not yet checked.
    pub fn is_blocking(&self) -> bool {
        self.is_required && !self.is_checked
    }
}

/// Immutable copy of one QC result as it stood at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcResultSnapshot {
    pub result_id: ResultId,
    pub test_id: TestId,
    pub test_code: String,
    pub test_name: String,
    pub parameter: Option<String>,
    pub result_value: String,
    pub numeric_value: Option<Decimal>,
    pub unit: Option<String>,
    pub passed: bool,
    pub deviation: Option<String>,
    pub tested_by: UserId,
    pub tested_at: Timestamp,
}
