//! SampleStatus enum for tracking the lifecycle of QC samples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a QC sample.
///
/// ```text
/// Pending ──receive──► Received ──recompute──► InTesting ──recompute──► Completed
///    │                    │  └──────────────recompute──────────────────────▲
///    └──cancel──► Cancelled ◄──cancel──┘
/// ```
///
/// `InTesting` and `Completed` are only ever written by status recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    #[default]
    Pending,
    Received,
    InTesting,
    Completed,
    Cancelled,
}

impl SampleStatus {
    /// Tests may be added until testing begins.
    pub fn accepts_test_assignment(&self) -> bool {
        matches!(self, SampleStatus::Pending | SampleStatus::Received)
    }

    /// Results may be recorded once the material is in the lab.
    pub fn accepts_results(&self) -> bool {
        matches!(
            self,
            SampleStatus::Received | SampleStatus::InTesting | SampleStatus::Completed
        )
    }

    /// Statuses whose value is derived from the result set.
    pub fn is_derived(&self) -> bool {
        matches!(self, SampleStatus::InTesting | SampleStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Pending => "pending",
            SampleStatus::Received => "received",
            SampleStatus::InTesting => "in_testing",
            SampleStatus::Completed => "completed",
            SampleStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the storage representation produced by [`as_str`](Self::as_str).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SampleStatus::Pending),
            "received" => Some(SampleStatus::Received),
            "in_testing" => Some(SampleStatus::InTesting),
            "completed" => Some(SampleStatus::Completed),
            "cancelled" => Some(SampleStatus::Cancelled),
            _ => None,
        }
    }
}

impl StateMachine for SampleStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use SampleStatus::*;
        match self {
            Pending => &[Received, Cancelled],
            Received => &[InTesting, Completed, Cancelled],
            InTesting => &[Completed],
            Completed => &[],
            Cancelled => &[],
        }
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SampleStatus::Pending => "Pending",
            SampleStatus::Received => "Received",
            SampleStatus::InTesting => "InTesting",
            SampleStatus::Completed => "Completed",
            SampleStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SampleStatus; 5] = [
        SampleStatus::Pending,
        SampleStatus::Received,
        SampleStatus::InTesting,
        SampleStatus::Completed,
        SampleStatus::Cancelled,
    ];

    #[test]
    fn default_is_pending() {
        assert_eq!(SampleStatus::default(), SampleStatus::Pending);
    }

    #[test]
    fn cancel_only_from_pending_or_received() {
        for status in ALL {
            let expected = matches!(status, SampleStatus::Pending | SampleStatus::Received);
            assert_eq!(
                status.can_transition_to(&SampleStatus::Cancelled),
                expected,
                "{:?}",
                status
            );
        }
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        assert!(SampleStatus::Completed.is_terminal());
        assert!(SampleStatus::Cancelled.is_terminal());
        assert!(!SampleStatus::InTesting.is_terminal());
    }

    #[test]
    fn pending_cannot_skip_receipt() {
        assert!(!SampleStatus::Pending.can_transition_to(&SampleStatus::InTesting));
        assert!(!SampleStatus::Pending.can_transition_to(&SampleStatus::Completed));
    }

    #[test]
    fn assignment_locks_once_testing_begins() {
        assert!(SampleStatus::Pending.accepts_test_assignment());
        assert!(SampleStatus::Received.accepts_test_assignment());
        assert!(!SampleStatus::InTesting.accepts_test_assignment());
        assert!(!SampleStatus::Completed.accepts_test_assignment());
        assert!(!SampleStatus::Cancelled.accepts_test_assignment());
    }

    #[test]
    fn storage_representation_roundtrips() {
        for status in ALL {
            assert_eq!(SampleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SampleStatus::parse("released"), None);
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SampleStatus::InTesting).unwrap(),
            "\"in_testing\""
        );
    }
}
