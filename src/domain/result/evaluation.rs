//! Pass/fail evaluation of a reported value against acceptance criteria.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::AcceptanceCriteria;
use crate::domain::foundation::DomainError;

/// Outcome of evaluating one reported value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub passed: bool,
    pub numeric_value: Option<Decimal>,
    pub deviation: Option<String>,
}

/// Evaluates a raw reported value.
///
/// Numeric criteria parse `raw_value` as a fixed-point decimal and ignore
/// `claimed_passed`. Qualitative criteria require `claimed_passed`.
/// A failing numeric value without a supplied `deviation` gets a generated
/// note describing the excursion.
///
/// # Errors
///
/// - `ValidationFailed` (field `resultValue`) if a numeric evaluation
///   receives a non-numeric value
/// - `ValidationFailed` (field `passed`) if a qualitative evaluation has no
///   explicit verdict
pub fn evaluate(
    criteria: AcceptanceCriteria,
    raw_value: &str,
    claimed_passed: Option<bool>,
    deviation: Option<String>,
    target_tolerance: Decimal,
) -> Result<Evaluation, DomainError> {
    let deviation = deviation.filter(|d| !d.trim().is_empty());

    if criteria == AcceptanceCriteria::Qualitative {
        let passed = claimed_passed.ok_or_else(|| {
            DomainError::validation(
                "passed",
                "Qualitative results must state pass/fail explicitly",
            )
        })?;
        return Ok(Evaluation {
            passed,
            numeric_value: raw_value.trim().parse::<Decimal>().ok(),
            deviation,
        });
    }

    let value = parse_numeric(raw_value)?;
    let passed = within(criteria, value, target_tolerance);
    let deviation = match deviation {
        Some(note) => Some(note),
        None if !passed => Some(describe_excursion(criteria, value, target_tolerance)),
        None => None,
    };

    Ok(Evaluation {
        passed,
        numeric_value: Some(value),
        deviation,
    })
}

/// True when `value` satisfies the criteria. Bounds are inclusive.
pub fn within(criteria: AcceptanceCriteria, value: Decimal, target_tolerance: Decimal) -> bool {
    match criteria {
        AcceptanceCriteria::Range { min, max } => min <= value && value <= max,
        AcceptanceCriteria::AtLeast(min) => value >= min,
        AcceptanceCriteria::AtMost(max) => value <= max,
        AcceptanceCriteria::Target(target) => (value - target).abs() <= target_tolerance.abs(),
        AcceptanceCriteria::Qualitative => true,
    }
}

fn parse_numeric(raw_value: &str) -> Result<Decimal, DomainError> {
    let trimmed = raw_value.trim();
    trimmed.parse::<Decimal>().map_err(|_| {
        DomainError::validation(
            "resultValue",
            format!("'{}' is not a numeric value", trimmed),
        )
    })
}

fn describe_excursion(criteria: AcceptanceCriteria, value: Decimal, target_tolerance: Decimal) -> String {
    match criteria {
        AcceptanceCriteria::Range { min, max } if value < min => {
            format!("Value {} is below specification range [{}, {}]", value, min, max)
        }
        AcceptanceCriteria::Range { min, max } => {
            format!("Value {} is above specification range [{}, {}]", value, min, max)
        }
        AcceptanceCriteria::AtLeast(min) => {
            format!("Value {} is below minimum {}", value, min)
        }
        AcceptanceCriteria::AtMost(max) => {
            format!("Value {} is above maximum {}", value, max)
        }
        AcceptanceCriteria::Target(target) => format!(
            "Value {} deviates from target {} by {} (tolerance {})",
            value,
            target,
            (value - target).abs(),
            target_tolerance.abs()
        ),
        AcceptanceCriteria::Qualitative => format!("Value {} failed", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;
    use proptest::prelude::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn range_90_110() -> AcceptanceCriteria {
        AcceptanceCriteria::Range {
            min: dec("90"),
            max: dec("110"),
        }
    }

    fn eval(criteria: AcceptanceCriteria, raw: &str) -> Evaluation {
        evaluate(criteria, raw, None, None, Decimal::ZERO).unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        assert!(eval(range_90_110(), "95").passed);
        assert!(eval(range_90_110(), "90").passed);
        assert!(eval(range_90_110(), "110").passed);
        assert!(!eval(range_90_110(), "115").passed);
        assert!(!eval(range_90_110(), "89.999").passed);
    }

    #[test]
    fn failing_value_gets_generated_deviation() {
        let evaluation = eval(range_90_110(), "115");
        assert_eq!(
            evaluation.deviation.as_deref(),
            Some("Value 115 is above specification range [90, 110]")
        );
    }

    #[test]
    fn supplied_deviation_wins() {
        let evaluation = evaluate(
            range_90_110(),
            "80",
            None,
            Some("OOS investigation QI-12 opened".into()),
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(evaluation.deviation.as_deref(), Some("OOS investigation QI-12 opened"));
    }

    #[test]
    fn passing_value_has_no_deviation() {
        assert!(eval(range_90_110(), "100.5").deviation.is_none());
    }

    #[test]
    fn numeric_evaluation_ignores_claimed_verdict() {
        let evaluation = evaluate(range_90_110(), "150", Some(true), None, Decimal::ZERO).unwrap();
        assert!(!evaluation.passed);
    }

    #[test]
    fn non_numeric_value_is_validation_error() {
        let err = evaluate(range_90_110(), "clear", None, None, Decimal::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.details.get("field").map(String::as_str), Some("resultValue"));
    }

    #[test]
    fn one_sided_bounds() {
        assert!(eval(AcceptanceCriteria::AtLeast(dec("98.0")), "98.0").passed);
        assert!(!eval(AcceptanceCriteria::AtLeast(dec("98.0")), "97.9").passed);
        assert!(eval(AcceptanceCriteria::AtMost(dec("0.5")), "0.5").passed);
        assert!(!eval(AcceptanceCriteria::AtMost(dec("0.5")), "0.51").passed);
    }

    #[test]
    fn target_respects_tolerance() {
        let criteria = AcceptanceCriteria::Target(dec("7.0"));
        assert!(evaluate(criteria, "7.0", None, None, Decimal::ZERO).unwrap().passed);
        assert!(!evaluate(criteria, "7.1", None, None, Decimal::ZERO).unwrap().passed);
        assert!(evaluate(criteria, "7.1", None, None, dec("0.2")).unwrap().passed);
        assert!(evaluate(criteria, "6.8", None, None, dec("0.2")).unwrap().passed);
        assert!(!evaluate(criteria, "6.7", None, None, dec("0.2")).unwrap().passed);
    }

    #[test]
    fn qualitative_requires_explicit_verdict() {
        let err = evaluate(AcceptanceCriteria::Qualitative, "Conforms", None, None, Decimal::ZERO)
            .unwrap_err();
        assert_eq!(err.details.get("field").map(String::as_str), Some("passed"));

        let evaluation = evaluate(
            AcceptanceCriteria::Qualitative,
            "Conforms",
            Some(true),
            None,
            Decimal::ZERO,
        )
        .unwrap();
        assert!(evaluation.passed);
        assert!(evaluation.numeric_value.is_none());
    }

    proptest! {
        #[test]
        fn range_verdict_matches_bounds(min in -1_000_000i64..1_000_000, span in 0i64..1_000_000, value in -2_000_000i64..2_000_000) {
            let (min, max, value) = (Decimal::new(min, 2), Decimal::new(min + span, 2), Decimal::new(value, 2));
            let evaluation = evaluate(
                AcceptanceCriteria::Range { min, max },
                &value.to_string(),
                None,
                None,
                Decimal::ZERO,
            ).unwrap();
            prop_assert_eq!(evaluation.passed, min <= value && value <= max);
            prop_assert_eq!(evaluation.deviation.is_some(), !evaluation.passed);
            prop_assert_eq!(evaluation.numeric_value, Some(value));
        }

        #[test]
        fn target_verdict_is_symmetric(target in -100_000i64..100_000, offset in 0i64..1_000, tolerance in 0i64..1_000) {
            let target = Decimal::new(target, 3);
            let offset = Decimal::new(offset, 3);
            let tolerance = Decimal::new(tolerance, 3);
            let criteria = AcceptanceCriteria::Target(target);
            let above = within(criteria, target + offset, tolerance);
            let below = within(criteria, target - offset, tolerance);
            prop_assert_eq!(above, below);
            prop_assert_eq!(above, offset <= tolerance);
        }
    }
}
