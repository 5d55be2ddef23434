//! Catalog-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, TestId};

/// Test catalog errors.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Test not found: {0}")]
    NotFound(TestId),

    #[error("Test code '{0}' already exists")]
    DuplicateCode(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl CatalogError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::NotFound(_) => ErrorCode::TestNotFound,
            CatalogError::DuplicateCode(_) => ErrorCode::DuplicateTestCode,
            CatalogError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CatalogError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err.kind() {
            ErrorKind::Validation => CatalogError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorKind::Conflict if err.code == ErrorCode::DuplicateTestCode => {
                CatalogError::DuplicateCode(err.details.get("code").cloned().unwrap_or_default())
            }
            _ => CatalogError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_kinds() {
        assert_eq!(CatalogError::NotFound(TestId::new()).kind(), ErrorKind::NotFound);
        assert_eq!(CatalogError::DuplicateCode("AS-01".into()).kind(), ErrorKind::Conflict);
        assert_eq!(CatalogError::validation("name", "empty").kind(), ErrorKind::Validation);
        assert_eq!(CatalogError::Infrastructure("db".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn domain_validation_keeps_field() {
        let err: CatalogError = DomainError::validation("code", "Code is required").into();
        match err {
            CatalogError::ValidationFailed { field, message } => {
                assert_eq!(field, "code");
                assert_eq!(message, "Code is required");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn duplicate_code_from_store_keeps_code() {
        let err: CatalogError = DomainError::new(ErrorCode::DuplicateTestCode, "unique violation")
            .with_detail("code", "AS-01")
            .into();
        assert!(matches!(err, CatalogError::DuplicateCode(code) if code == "AS-01"));
    }
}
