//! Release status and decision enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Review progress of a release.
///
/// `Pending` until the first checklist update, `Reviewed` while the
/// reviewer works through the checklist, `Decided` once a terminal decision
/// is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    #[default]
    Pending,
    Reviewed,
    Decided,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Pending => "pending",
            ReleaseStatus::Reviewed => "reviewed",
            ReleaseStatus::Decided => "decided",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReleaseStatus::Pending),
            "reviewed" => Some(ReleaseStatus::Reviewed),
            "decided" => Some(ReleaseStatus::Decided),
            _ => None,
        }
    }
}

impl StateMachine for ReleaseStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use ReleaseStatus::*;
        match self {
            Pending => &[Reviewed, Decided],
            Reviewed => &[Decided],
            Decided => &[],
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// QA disposition of the sampled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[default]
    Pending,
    Release,
    Reject,
    Hold,
}

impl Decision {
    /// Release, Reject and Hold are final; there is no path back.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pending => "pending",
            Decision::Release => "release",
            Decision::Reject => "reject",
            Decision::Hold => "hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Decision::Pending),
            "release" => Some(Decision::Release),
            "reject" => Some(Decision::Reject),
            "hold" => Some(Decision::Hold),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the decision has reached the owning inventory/batch domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// No decision yet, nothing to deliver.
    #[default]
    NotRequired,
    Pending,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::NotRequired => "not_required",
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_required" => Some(DeliveryStatus::NotRequired),
            "pending" => Some(DeliveryStatus::Pending),
            "delivered" => Some(DeliveryStatus::Delivered),
            _ => None,
        }
    }
}
