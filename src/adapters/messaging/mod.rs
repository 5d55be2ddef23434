//! Message-pattern endpoints of the catalog, QC and QA services.
//!
//! Each service is a [`MessageHandler`](crate::ports::MessageHandler) that
//! decodes a camelCase JSON payload, runs the matching application handler
//! and encodes the outcome. Failures leave as [`ServiceError`] bodies.

mod catalog;
pub mod dto;
mod errors;
pub mod patterns;
mod qa;
mod qc;

pub use catalog::CatalogService;
pub use qa::QaService;
pub use qc::QcService;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{CommandMetadata, ErrorCode, UserId};
use crate::ports::ServiceError;

/// Keys no patch may carry; these fields change only through transitions.
const WRITE_PROTECTED: &[&str] = &["status", "decision"];

fn decode<T: DeserializeOwned>(payload: JsonValue) -> Result<T, ServiceError> {
    serde_json::from_value(payload)
        .map_err(|e| ServiceError::validation(format!("Invalid payload: {}", e)))
}

/// Decode a patch after rejecting write-protected keys.
fn decode_patch<T: DeserializeOwned>(patch: JsonValue) -> Result<T, ServiceError> {
    let Some(fields) = patch.as_object() else {
        return Err(ServiceError::validation("patch must be an object"));
    };
    if let Some(key) = WRITE_PROTECTED.iter().find(|k| fields.contains_key(**k)) {
        return Err(ServiceError::new(
            ErrorCode::WriteProtectedField,
            format!("'{}' cannot be patched; it changes only through its transitions", key),
        ));
    }
    decode(patch)
}

fn encode<T: Serialize>(value: &T) -> Result<JsonValue, ServiceError> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::new(ErrorCode::SerializationError, e.to_string()))
}

fn metadata(actor: Option<UserId>, correlation_id: Option<String>) -> CommandMetadata {
    let metadata = match actor {
        Some(user) => CommandMetadata::new(user),
        None => CommandMetadata::system(),
    };
    match correlation_id {
        Some(id) => metadata.with_correlation_id(id),
        None => metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::TestPatch;
    use crate::domain::foundation::ErrorKind;
    use serde_json::json;

    #[test]
    fn status_and_decision_are_write_protected() {
        for key in ["status", "decision"] {
            let err = decode_patch::<TestPatch>(json!({ key: "completed", "name": "x" }))
                .unwrap_err();
            assert_eq!(err.code, "WRITE_PROTECTED_FIELD");
            assert_eq!(err.kind, ErrorKind::Validation);
        }
    }

    #[test]
    fn unknown_patch_keys_are_validation_errors() {
        let err = decode_patch::<TestPatch>(json!({ "colour": "red" })).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn correlation_id_is_carried() {
        let meta = metadata(None, Some("corr-9".into()));
        assert_eq!(meta.correlation_id(), "corr-9");
    }
}
