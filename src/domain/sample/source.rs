//! Polymorphic pointer from a sample to the entity it was drawn from.
//!
//! Ids are only unique within their source type; a `SourceRef` is always
//! compared as the pair.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Kind of entity a sample (and later a release) points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A goods-receipt line flagged for sampling (owned by inventory).
    GoodsReceipt,
    /// A manufacturing batch (owned by batch/production).
    Batch,
    /// A production order output (owned by batch/production).
    ProductionOrder,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::GoodsReceipt => "goods_receipt",
            SourceType::Batch => "batch",
            SourceType::ProductionOrder => "production_order",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "goods_receipt" => Some(SourceType::GoodsReceipt),
            "batch" => Some(SourceType::Batch),
            "production_order" => Some(SourceType::ProductionOrder),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged reference to the originating entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub source_type: SourceType,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
}

impl SourceRef {
    pub fn new(
        source_type: SourceType,
        source_id: impl Into<String>,
        source_reference: Option<String>,
    ) -> Result<Self, ValidationError> {
        let source_id = source_id.into().trim().to_string();
        if source_id.is_empty() {
            return Err(ValidationError::empty_field("source_id"));
        }
        Ok(Self {
            source_type,
            source_id,
            source_reference: source_reference.filter(|r| !r.trim().is_empty()),
        })
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_id() {
        assert!(SourceRef::new(SourceType::Batch, "  ", None).is_err());
    }

    #[test]
    fn display_is_type_qualified() {
        let source = SourceRef::new(SourceType::GoodsReceipt, "42", Some("GR-7/1".into())).unwrap();
        assert_eq!(source.to_string(), "goods_receipt:42");
    }

    #[test]
    fn same_id_different_type_is_different_source() {
        let a = SourceRef::new(SourceType::GoodsReceipt, "42", None).unwrap();
        let b = SourceRef::new(SourceType::Batch, "42", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let source: SourceRef = serde_json::from_value(serde_json::json!({
            "sourceType": "goods_receipt",
            "sourceId": "GRI-100",
        }))
        .unwrap();
        assert_eq!(source.source_type, SourceType::GoodsReceipt);
        assert!(source.source_reference.is_none());
    }
}
