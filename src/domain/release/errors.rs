//! QA release error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, ReleaseId, SampleId};

/// Disposition coordinator errors.
#[derive(Debug, Clone, Error)]
pub enum ReleaseError {
    #[error("Release not found: {0}")]
    NotFound(ReleaseId),

    #[error("Sample not found: {0}")]
    SampleNotFound(SampleId),

    #[error("Checklist item not found: {0}")]
    ChecklistItemNotFound(String),

    #[error("{0}")]
    SampleNotCompleted(String),

    #[error("{0}")]
    AlreadyDecided(String),

    #[error("{0}")]
    ConcurrentModification(String),

    #[error("Release {0} has no decision to deliver")]
    NothingToDeliver(ReleaseId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Upstream call failed: {message}")]
    Upstream { code: ErrorCode, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl ReleaseError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ReleaseError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ReleaseError::NotFound(_) => ErrorCode::ReleaseNotFound,
            ReleaseError::SampleNotFound(_) => ErrorCode::SampleNotFound,
            ReleaseError::ChecklistItemNotFound(_) => ErrorCode::ChecklistItemNotFound,
            ReleaseError::SampleNotCompleted(_) => ErrorCode::SampleNotCompleted,
            ReleaseError::AlreadyDecided(_) => ErrorCode::DecisionAlreadyRecorded,
            ReleaseError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            ReleaseError::NothingToDeliver(_) => ErrorCode::InvalidStateTransition,
            ReleaseError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ReleaseError::Upstream { code, .. } => *code,
            ReleaseError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for ReleaseError {
    fn from(err: DomainError) -> Self {
        match (err.code, err.kind()) {
            (ErrorCode::DecisionAlreadyRecorded, _) => ReleaseError::AlreadyDecided(err.message),
            (ErrorCode::ChecklistItemNotFound, _) => {
                ReleaseError::ChecklistItemNotFound(err.message)
            }
            (_, ErrorKind::Validation) => ReleaseError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            (code, ErrorKind::Timeout | ErrorKind::Remote) => ReleaseError::Upstream {
                code,
                message: err.message,
            },
            (ErrorCode::ConcurrentModification, _) => {
                ReleaseError::ConcurrentModification(err.message)
            }
            (_, ErrorKind::Conflict) => ReleaseError::AlreadyDecided(err.message),
            _ => ReleaseError::Infrastructure(err.to_string()),
        }
    }
}
