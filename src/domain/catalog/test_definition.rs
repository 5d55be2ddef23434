//! TestDefinition aggregate - a coded laboratory procedure and its specifications.
//!
//! A test and its specifications form one unit: they are created together,
//! and an update that touches specifications replaces the whole list.
//! Specifications never outlive their parent.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{AcceptanceCriteria, Specification};
use crate::domain::foundation::{DomainError, TestId, Timestamp, ValidationError};
use rust_decimal::Decimal;

/// Category assigned when a definition does not name one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Input for one specification row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecificationDraft {
    pub parameter: String,
    #[serde(default)]
    pub min_value: Option<Decimal>,
    #[serde(default)]
    pub max_value: Option<Decimal>,
    #[serde(default)]
    pub target_value: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

impl SpecificationDraft {
    fn build(self) -> Result<Specification, ValidationError> {
        Specification::new(
            self.parameter,
            self.min_value,
            self.max_value,
            self.target_value,
            self.unit,
            self.method,
        )
    }
}

/// Input for creating a test definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestDraft {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub material_ids: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<SpecificationDraft>,
}

/// Partial update for a test definition.
///
/// Unknown keys (including `status`) are rejected at deserialization.
/// `specifications`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub material_ids: Option<Vec<String>>,
    #[serde(default)]
    pub specifications: Option<Vec<SpecificationDraft>>,
}

impl TestPatch {
    pub fn is_empty(&self) -> bool {
        self == &TestPatch::default()
    }
}

/// Laboratory test definition aggregate.
///
/// # Invariants
///
/// - `name` and `code` are non-empty; `code` is stored upper-cased
/// - specification parameters are unique within the test (case-insensitive)
/// - a test with zero specifications is qualitative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    id: TestId,
    name: String,
    code: String,
    category: String,
    description: Option<String>,
    is_active: bool,
    material_ids: Vec<String>,
    specifications: Vec<Specification>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TestDefinition {
    /// Create a new, active test definition.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` family if name/code are blank or a specification is malformed
    pub fn new(draft: TestDraft) -> Result<Self, DomainError> {
        let name = required("name", draft.name)?;
        let code = normalize_code(draft.code)?;
        let specifications = build_specifications(draft.specifications)?;

        let now = Timestamp::now();
        Ok(Self {
            id: TestId::new(),
            name,
            code,
            category: normalize_category(draft.category),
            description: draft.description.filter(|d| !d.trim().is_empty()),
            is_active: true,
            material_ids: normalize_material_ids(draft.material_ids),
            specifications,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a test from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TestId,
        name: String,
        code: String,
        category: String,
        description: Option<String>,
        is_active: bool,
        material_ids: Vec<String>,
        specifications: Vec<Specification>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            code,
            category,
            description,
            is_active,
            material_ids,
            specifications,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> TestId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn material_ids(&self) -> &[String] {
        &self.material_ids
    }

    pub fn specifications(&self) -> &[Specification] {
        &self.specifications
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// A test is qualitative when none of its specifications carries numeric criteria.
    pub fn is_qualitative(&self) -> bool {
        !self.specifications.iter().any(Specification::is_numeric)
    }

    /// True when this test is explicitly bound to the material.
    pub fn is_bound_to(&self, material_id: &str) -> bool {
        self.material_ids.iter().any(|m| m == material_id.trim())
    }

    /// Case-insensitive category match.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category.trim())
    }

    /// Resolves the specification a result should be evaluated against.
    ///
    /// With a named parameter the matching specification is returned. Without
    /// one, a test with a single specification resolves to it and a test with
    /// none resolves to `None` (qualitative).
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the parameter is unknown, or omitted while the
    ///   test has several specifications
    pub fn specification_for(
        &self,
        parameter: Option<&str>,
    ) -> Result<Option<&Specification>, DomainError> {
        match parameter.map(str::trim).filter(|p| !p.is_empty()) {
            Some(parameter) => self
                .specifications
                .iter()
                .find(|s| s.matches_parameter(parameter))
                .map(Some)
                .ok_or_else(|| {
                    DomainError::validation(
                        "parameter",
                        format!("Test {} has no specification for '{}'", self.code, parameter),
                    )
                }),
            None => match self.specifications.as_slice() {
                [] => Ok(None),
                [only] => Ok(Some(only)),
                _ => Err(DomainError::validation(
                    "parameter",
                    format!(
                        "Test {} has {} specifications; parameter is required",
                        self.code,
                        self.specifications.len()
                    ),
                )),
            },
        }
    }

    /// Criteria for a parameter, `Qualitative` when no specification applies.
    pub fn criteria_for(&self, parameter: Option<&str>) -> Result<AcceptanceCriteria, DomainError> {
        Ok(self
            .specification_for(parameter)?
            .map(Specification::criteria)
            .unwrap_or(AcceptanceCriteria::Qualitative))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a partial update. Returns true when specifications were replaced.
    ///
    /// The patch is validated as a whole before any field changes, so a
    /// rejected patch leaves the aggregate untouched.
    pub fn apply_patch(&mut self, patch: TestPatch) -> Result<bool, DomainError> {
        let name = patch.name.map(|n| required("name", n)).transpose()?;
        let code = patch.code.map(normalize_code).transpose()?;
        let specifications = patch
            .specifications
            .map(build_specifications)
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(code) = code {
            self.code = code;
        }
        if let Some(category) = patch.category {
            self.category = normalize_category(Some(category));
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(material_ids) = patch.material_ids {
            self.material_ids = normalize_material_ids(material_ids);
        }
        let replaced = specifications.is_some();
        if let Some(specifications) = specifications {
            self.specifications = specifications;
        }

        self.updated_at = Timestamp::now();
        Ok(replaced)
    }
}

fn required(field: &str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field).into());
    }
    Ok(trimmed.to_string())
}

fn normalize_code(code: String) -> Result<String, DomainError> {
    Ok(required("code", code)?.to_ascii_uppercase())
}

fn normalize_category(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn normalize_material_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

fn build_specifications(drafts: Vec<SpecificationDraft>) -> Result<Vec<Specification>, DomainError> {
    let mut seen = HashSet::new();
    let mut specifications = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let spec = draft.build()?;
        if !seen.insert(spec.parameter().to_ascii_lowercase()) {
            return Err(DomainError::validation(
                "specifications",
                format!("Duplicate specification parameter '{}'", spec.parameter()),
            ));
        }
        specifications.push(spec);
    }
    Ok(specifications)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, ErrorKind};

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn assay(min: &str, max: &str) -> SpecificationDraft {
        SpecificationDraft {
            parameter: "Assay".to_string(),
            min_value: Some(dec(min)),
            max_value: Some(dec(max)),
            unit: Some("%".to_string()),
            method: Some("HPLC".to_string()),
            ..Default::default()
        }
    }

    fn draft() -> TestDraft {
        TestDraft {
            name: "Assay by HPLC".to_string(),
            code: "as-01".to_string(),
            category: Some("API".to_string()),
            specifications: vec![assay("90", "110")],
            ..Default::default()
        }
    }

    #[test]
    fn new_test_is_active_with_normalized_code() {
        let test = TestDefinition::new(draft()).unwrap();
        assert!(test.is_active());
        assert_eq!(test.code(), "AS-01");
        assert_eq!(test.category(), "API");
        assert_eq!(test.specifications().len(), 1);
        assert!(!test.is_qualitative());
    }

    #[test]
    fn new_rejects_missing_name_or_code() {
        let err = TestDefinition::new(TestDraft {
            name: " ".to_string(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = TestDefinition::new(TestDraft {
            code: String::new(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }

    #[test]
    fn new_without_category_uses_default() {
        let test = TestDefinition::new(TestDraft {
            category: None,
            ..draft()
        })
        .unwrap();
        assert_eq!(test.category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn zero_specifications_is_qualitative() {
        let test = TestDefinition::new(TestDraft {
            specifications: vec![],
            ..draft()
        })
        .unwrap();
        assert!(test.is_qualitative());
        assert_eq!(test.criteria_for(None).unwrap(), AcceptanceCriteria::Qualitative);
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        let result = TestDefinition::new(TestDraft {
            specifications: vec![assay("90", "110"), assay("95", "105")],
            ..draft()
        });
        assert!(result.is_err());
    }

    #[test]
    fn specification_for_requires_parameter_when_ambiguous() {
        let mut ph = assay("6", "8");
        ph.parameter = "pH".to_string();
        let test = TestDefinition::new(TestDraft {
            specifications: vec![assay("90", "110"), ph],
            ..draft()
        })
        .unwrap();

        assert!(test.specification_for(None).is_err());
        assert_eq!(
            test.specification_for(Some("ph")).unwrap().unwrap().parameter(),
            "pH"
        );
        assert!(test.specification_for(Some("Viscosity")).is_err());
    }

    #[test]
    fn single_specification_resolves_without_parameter() {
        let test = TestDefinition::new(draft()).unwrap();
        assert_eq!(
            test.criteria_for(None).unwrap(),
            AcceptanceCriteria::Range {
                min: dec("90"),
                max: dec("110")
            }
        );
    }

    #[test]
    fn patch_replaces_specifications_wholesale() {
        let mut test = TestDefinition::new(draft()).unwrap();
        let mut water = assay("0", "0.5");
        water.parameter = "Water".to_string();

        let replaced = test
            .apply_patch(TestPatch {
                specifications: Some(vec![water]),
                ..Default::default()
            })
            .unwrap();

        assert!(replaced);
        assert_eq!(test.specifications().len(), 1);
        assert_eq!(test.specifications()[0].parameter(), "Water");
    }

    #[test]
    fn patch_without_specifications_keeps_them() {
        let mut test = TestDefinition::new(draft()).unwrap();
        let replaced = test
            .apply_patch(TestPatch {
                name: Some("Assay (USP)".to_string()),
                is_active: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert!(!replaced);
        assert_eq!(test.name(), "Assay (USP)");
        assert!(!test.is_active());
        assert_eq!(test.specifications().len(), 1);
    }

    #[test]
    fn invalid_patch_leaves_test_untouched() {
        let mut test = TestDefinition::new(draft()).unwrap();
        let before = test.clone();

        let result = test.apply_patch(TestPatch {
            name: Some("Renamed".to_string()),
            specifications: Some(vec![assay("110", "90")]),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(test, before);
    }

    #[test]
    fn patch_rejects_status_key() {
        let result: Result<TestPatch, _> =
            serde_json::from_value(serde_json::json!({ "status": "retired" }));
        assert!(result.is_err());
    }

    #[test]
    fn material_bindings_are_deduplicated() {
        let test = TestDefinition::new(TestDraft {
            material_ids: vec!["MAT-1".into(), " MAT-1 ".into(), "".into(), "MAT-2".into()],
            ..draft()
        })
        .unwrap();
        assert_eq!(test.material_ids(), &["MAT-1".to_string(), "MAT-2".to_string()]);
        assert!(test.is_bound_to("MAT-2"));
        assert!(test.in_category("api"));
    }
}
