//! Sample-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, SampleId, TestId};

/// Sample lifecycle errors.
#[derive(Debug, Clone, Error)]
pub enum SampleError {
    #[error("Sample not found: {0}")]
    NotFound(SampleId),

    #[error("Test {0} is unknown or inactive")]
    UnknownTest(TestId),

    #[error("{0}")]
    TestsLocked(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Sample {0} was modified concurrently")]
    ConcurrentModification(SampleId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Upstream call failed: {message}")]
    Upstream { code: ErrorCode, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl SampleError {
    pub fn not_found(id: SampleId) -> Self {
        SampleError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SampleError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SampleError::NotFound(_) => ErrorCode::SampleNotFound,
            SampleError::UnknownTest(_) => ErrorCode::ValidationFailed,
            SampleError::TestsLocked(_) => ErrorCode::TestsLocked,
            SampleError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SampleError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            SampleError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SampleError::Upstream { code, .. } => *code,
            SampleError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for SampleError {
    fn from(err: DomainError) -> Self {
        match (err.code, err.kind()) {
            (ErrorCode::TestsLocked, _) => SampleError::TestsLocked(err.message),
            (_, ErrorKind::Validation) => SampleError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            (_, ErrorKind::Conflict) => SampleError::InvalidState(err.message),
            (code, ErrorKind::Timeout | ErrorKind::Remote) => SampleError::Upstream {
                code,
                message: err.message,
            },
            _ => SampleError::Infrastructure(err.to_string()),
        }
    }
}
