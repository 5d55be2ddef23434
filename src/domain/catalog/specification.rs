//! Specification value object - acceptance criteria for one tested parameter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SpecificationId, ValidationError};

/// Acceptable range (or target) for one parameter of a test.
///
/// # Invariants
///
/// - `parameter` is non-empty
/// - when both bounds are present, `min_value <= max_value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    id: SpecificationId,
    parameter: String,
    min_value: Option<Decimal>,
    max_value: Option<Decimal>,
    target_value: Option<Decimal>,
    unit: Option<String>,
    method: Option<String>,
}

/// Numeric acceptance criteria derived from a specification's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceCriteria {
    /// Inclusive range `[min, max]`.
    Range { min: Decimal, max: Decimal },
    /// Value must be at least `min`.
    AtLeast(Decimal),
    /// Value must be at most `max`.
    AtMost(Decimal),
    /// Value must equal `target` within the configured tolerance.
    Target(Decimal),
    /// No numeric criteria; pass/fail is asserted by the analyst.
    Qualitative,
}

impl Specification {
    /// Creates a validated specification.
    pub fn new(
        parameter: impl Into<String>,
        min_value: Option<Decimal>,
        max_value: Option<Decimal>,
        target_value: Option<Decimal>,
        unit: Option<String>,
        method: Option<String>,
    ) -> Result<Self, ValidationError> {
        let parameter = parameter.into().trim().to_string();
        if parameter.is_empty() {
            return Err(ValidationError::empty_field("parameter"));
        }
        if let (Some(min), Some(max)) = (min_value, max_value) {
            if min > max {
                return Err(ValidationError::out_of_range(
                    "min_value",
                    format!("min {} exceeds max {} for '{}'", min, max, parameter),
                ));
            }
        }

        Ok(Self {
            id: SpecificationId::new(),
            parameter,
            min_value,
            max_value,
            target_value,
            unit: unit.filter(|u| !u.trim().is_empty()),
            method: method.filter(|m| !m.trim().is_empty()),
        })
    }

    /// Reconstitute a specification from persistence (no validation).
    pub fn reconstitute(
        id: SpecificationId,
        parameter: String,
        min_value: Option<Decimal>,
        max_value: Option<Decimal>,
        target_value: Option<Decimal>,
        unit: Option<String>,
        method: Option<String>,
    ) -> Self {
        Self {
            id,
            parameter,
            min_value,
            max_value,
            target_value,
            unit,
            method,
        }
    }

    pub fn id(&self) -> SpecificationId {
        self.id
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn min_value(&self) -> Option<Decimal> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<Decimal> {
        self.max_value
    }

    pub fn target_value(&self) -> Option<Decimal> {
        self.target_value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Case-insensitive parameter match.
    pub fn matches_parameter(&self, parameter: &str) -> bool {
        self.parameter.eq_ignore_ascii_case(parameter.trim())
    }

    /// Derives the numeric criteria. Bounds take precedence over a target.
    pub fn criteria(&self) -> AcceptanceCriteria {
        match (self.min_value, self.max_value, self.target_value) {
            (Some(min), Some(max), _) => AcceptanceCriteria::Range { min, max },
            (Some(min), None, _) => AcceptanceCriteria::AtLeast(min),
            (None, Some(max), _) => AcceptanceCriteria::AtMost(max),
            (None, None, Some(target)) => AcceptanceCriteria::Target(target),
            (None, None, None) => AcceptanceCriteria::Qualitative,
        }
    }

    /// True when results against this specification are compared numerically.
    pub fn is_numeric(&self) -> bool {
        self.criteria() != AcceptanceCriteria::Qualitative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn new_trims_parameter() {
        let spec = Specification::new("  Assay ", None, None, None, None, None).unwrap();
        assert_eq!(spec.parameter(), "Assay");
    }

    #[test]
    fn new_rejects_empty_parameter() {
        let err = Specification::new("  ", None, None, None, None, None).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("parameter"));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let result = Specification::new("Assay", Some(dec("110")), Some(dec("90")), None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn equal_bounds_are_allowed() {
        assert!(Specification::new("pH", Some(dec("7.0")), Some(dec("7.0")), None, None, None).is_ok());
    }

    #[test]
    fn criteria_prefers_bounds_over_target() {
        let spec = Specification::new(
            "Assay",
            Some(dec("90")),
            Some(dec("110")),
            Some(dec("100")),
            Some("%".to_string()),
            Some("HPLC".to_string()),
        )
        .unwrap();
        assert_eq!(
            spec.criteria(),
            AcceptanceCriteria::Range {
                min: dec("90"),
                max: dec("110")
            }
        );
    }

    #[test]
    fn criteria_falls_back_to_target_then_qualitative() {
        let target = Specification::new("Density", None, None, Some(dec("1.02")), None, None).unwrap();
        assert_eq!(target.criteria(), AcceptanceCriteria::Target(dec("1.02")));

        let qualitative = Specification::new("Appearance", None, None, None, None, None).unwrap();
        assert_eq!(qualitative.criteria(), AcceptanceCriteria::Qualitative);
        assert!(!qualitative.is_numeric());
    }

    #[test]
    fn one_sided_bounds_produce_one_sided_criteria() {
        let nmt = Specification::new("Water", None, Some(dec("0.5")), None, None, None).unwrap();
        assert_eq!(nmt.criteria(), AcceptanceCriteria::AtMost(dec("0.5")));

        let nlt = Specification::new("Purity", Some(dec("99")), None, None, None, None).unwrap();
        assert_eq!(nlt.criteria(), AcceptanceCriteria::AtLeast(dec("99")));
    }

    #[test]
    fn blank_unit_and_method_are_dropped() {
        let spec =
            Specification::new("Assay", None, None, None, Some(" ".into()), Some("".into())).unwrap();
        assert!(spec.unit().is_none());
        assert!(spec.method().is_none());
    }

    #[test]
    fn matches_parameter_ignores_case() {
        let spec = Specification::new("Assay", None, None, None, None, None).unwrap();
        assert!(spec.matches_parameter("assay"));
        assert!(!spec.matches_parameter("pH"));
    }
}
