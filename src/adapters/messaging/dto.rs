//! Message payload DTOs.
//!
//! Requests are camelCase JSON. Aggregates are returned in their own serde
//! form, so only requests and composite responses are defined here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{
    ChecklistItemId, ReleaseId, ResultId, SampleId, TestId, Timestamp, UserId,
};
use crate::domain::release::{DispositionEvent, Release};
use crate::domain::sample::{MaterialInfo, SampleDraft, SamplePriority, SourceRef};
use crate::ports::ServiceError;

// ════════════════════════════════════════════════════════════════════════════
// Shared
// ════════════════════════════════════════════════════════════════════════════

/// `{ "id": ... }` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRequest<T> {
    pub id: T,
}

/// `{ "id": ..., "patch": {...} }` payload. The patch stays raw until its
/// keys have been checked.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchRequest<T> {
    pub id: T,
    pub patch: JsonValue,
}

// ════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListForMaterialRequest {
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// QC
// ════════════════════════════════════════════════════════════════════════════

/// Fields shared by `sample.create` and `sample.createFromSource`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFields {
    pub source: SourceRef,
    pub material: MaterialInfo,
    #[serde(default)]
    pub batch_number: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default)]
    pub priority: Option<SamplePriority>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub requested_by: String,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
}

impl SampleFields {
    pub fn into_draft(self) -> Result<SampleDraft, ServiceError> {
        let source = SourceRef::new(
            self.source.source_type,
            self.source.source_id,
            self.source.source_reference,
        )
        .map_err(|e| ServiceError::validation(e.to_string()))?;
        let assigned_to = self
            .assigned_to
            .filter(|a| !a.trim().is_empty())
            .map(UserId::new)
            .transpose()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        Ok(SampleDraft {
            source,
            material: self.material,
            batch_number: self.batch_number.filter(|b| !b.trim().is_empty()),
            quantity: self.quantity,
            unit: self.unit,
            priority: self.priority.unwrap_or_default(),
            assigned_to,
            requested_by: user(&self.requested_by, "requestedBy")?,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSampleRequest {
    #[serde(flatten)]
    pub sample: SampleFields,
    pub test_ids: Vec<TestId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromSourceRequest {
    #[serde(flatten)]
    pub sample: SampleFields,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTestsRequest {
    pub id: SampleId,
    pub test_ids: Vec<TestId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelSampleRequest {
    pub id: SampleId,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    pub sample_id: SampleId,
    pub test_id: TestId,
    /// Reported as text or as a JSON number.
    pub result_value: JsonValue,
    #[serde(default)]
    pub unit: Option<String>,
    pub tested_by: String,
    #[serde(default)]
    pub tested_at: Option<Timestamp>,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub deviation: Option<String>,
}

impl SubmitResultRequest {
    pub fn raw_value(&self) -> Result<String, ServiceError> {
        match &self.result_value {
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(n) => Ok(n.to_string()),
            _ => Err(ServiceError::validation(
                "resultValue must be a string or a number",
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleIdRequest {
    pub sample_id: SampleId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResultRequest {
    pub result_id: ResultId,
    pub reviewed_by: String,
}

// ════════════════════════════════════════════════════════════════════════════
// QA
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitToQaRequest {
    pub sample_id: SampleId,
    pub submitted_by: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChecklistRequest {
    pub release_id: ReleaseId,
    pub item_id: ChecklistItemId,
    pub checked: bool,
    #[serde(default)]
    pub checked_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    pub release_id: ReleaseId,
    pub decision: String,
    #[serde(default)]
    pub remarks: Option<String>,
    pub decided_by: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseIdRequest {
    pub release_id: ReleaseId,
}

/// `release.get` accepts either a release id or a sample id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReleaseRequest {
    #[serde(default)]
    pub id: Option<ReleaseId>,
    #[serde(default)]
    pub sample_id: Option<SampleId>,
}

/// Outcome of the delivery attempt that follows a decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideResponse {
    pub release: Release,
    pub disposition: DispositionEvent,
    pub delivery: DeliveryReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub release_id: ReleaseId,
    pub release_number: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn user(value: &str, field: &str) -> Result<UserId, ServiceError> {
    UserId::new(value.trim())
        .map_err(|_| ServiceError::validation(format!("{} must not be empty", field)))
}
