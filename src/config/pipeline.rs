//! Business settings for the catalog, QC evaluation and QA submission.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;

use super::error::ValidationError;
use crate::application::SubmissionPolicy;

/// Checklist and review window applied to every new release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseConfig {
    /// Required checklist categories (comma-separated)
    #[serde(default = "default_required_checklist")]
    pub required_checklist: String,

    /// Optional checklist categories (comma-separated)
    #[serde(default)]
    pub optional_checklist: String,

    #[serde(default = "default_review_window_days")]
    pub review_window_days: i64,
}

impl ReleaseConfig {
    pub fn policy(&self) -> SubmissionPolicy {
        SubmissionPolicy {
            required_checklist: split_list(&self.required_checklist),
            optional_checklist: split_list(&self.optional_checklist),
            review_window_days: self.review_window_days,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=365).contains(&self.review_window_days) {
            return Err(ValidationError::InvalidReviewWindow);
        }
        let policy = self.policy();
        let mut seen = HashSet::new();
        for category in policy
            .required_checklist
            .iter()
            .chain(policy.optional_checklist.iter())
        {
            if !seen.insert(category.to_lowercase()) {
                return Err(ValidationError::DuplicateChecklistItem(category.clone()));
            }
        }
        Ok(())
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            required_checklist: default_required_checklist(),
            optional_checklist: String::new(),
            review_window_days: default_review_window_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Reject a test whose code is already taken
    #[serde(default = "default_true")]
    pub require_unique_codes: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            require_unique_codes: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Allowed distance from a target-only specification, as a decimal string
    #[serde(default = "default_tolerance")]
    pub target_tolerance: String,
}

impl EvaluationConfig {
    pub fn tolerance(&self) -> Result<Decimal, ValidationError> {
        let raw = self.target_tolerance.trim();
        match Decimal::from_str(raw) {
            Ok(value) if !value.is_sign_negative() => Ok(value),
            _ => Err(ValidationError::InvalidTolerance(raw.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tolerance().map(|_| ())
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            target_tolerance: default_tolerance(),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_required_checklist() -> String {
    "Documentation,Visual Inspection,COA Attached".to_string()
}

fn default_review_window_days() -> i64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> String {
    "0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_submission_default() {
        let policy = ReleaseConfig::default().policy();
        let fallback = SubmissionPolicy::default();
        assert_eq!(policy.required_checklist, fallback.required_checklist);
        assert_eq!(policy.optional_checklist, fallback.optional_checklist);
        assert_eq!(policy.review_window_days, fallback.review_window_days);
    }

    #[test]
    fn checklist_lists_are_split_and_trimmed() {
        let config = ReleaseConfig {
            required_checklist: "Documentation, COA Attached ,".to_string(),
            optional_checklist: "Retain Sample".to_string(),
            review_window_days: 3,
        };
        let policy = config.policy();
        assert_eq!(policy.required_checklist, vec!["Documentation", "COA Attached"]);
        assert_eq!(policy.optional_checklist, vec!["Retain Sample"]);
    }

    #[test]
    fn duplicate_categories_are_rejected_across_lists() {
        let config = ReleaseConfig {
            optional_checklist: "documentation".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateChecklistItem("documentation".to_string()))
        );
    }

    #[test]
    fn review_window_must_be_positive() {
        let config = ReleaseConfig {
            review_window_days: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidReviewWindow));
    }

    #[test]
    fn tolerance_parses_decimal_strings() {
        let config = EvaluationConfig {
            target_tolerance: " 0.5 ".to_string(),
        };
        assert_eq!(config.tolerance().unwrap(), Decimal::new(5, 1));
    }

    #[test]
    fn negative_or_garbage_tolerance_is_rejected() {
        for raw in ["-1", "abc"] {
            let config = EvaluationConfig {
                target_tolerance: raw.to_string(),
            };
            assert!(config.validate().is_err(), "{}", raw);
        }
    }
}
