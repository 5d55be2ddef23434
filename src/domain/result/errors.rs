//! Result evaluator error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, ResultId, SampleId, TestId};
use crate::domain::sample::SampleError;

/// Result evaluator errors.
#[derive(Debug, Clone, Error)]
pub enum ResultError {
    #[error("Sample not found: {0}")]
    SampleNotFound(SampleId),

    #[error("Test not found: {0}")]
    TestNotFound(TestId),

    #[error("Result not found: {0}")]
    NotFound(ResultId),

    #[error("Test {test_id} is not assigned to sample {sample_id}")]
    TestNotAssigned { sample_id: SampleId, test_id: TestId },

    #[error("Sample is not accepting results: {0}")]
    SampleNotReady(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Upstream call failed: {message}")]
    Upstream { code: ErrorCode, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl ResultError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ResultError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ResultError::SampleNotFound(_) => ErrorCode::SampleNotFound,
            ResultError::TestNotFound(_) => ErrorCode::TestNotFound,
            ResultError::NotFound(_) => ErrorCode::ResultNotFound,
            ResultError::TestNotAssigned { .. } => ErrorCode::ValidationFailed,
            ResultError::SampleNotReady(_) => ErrorCode::InvalidStateTransition,
            ResultError::Conflict(_) => ErrorCode::ConcurrentModification,
            ResultError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ResultError::Upstream { code, .. } => *code,
            ResultError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

impl From<DomainError> for ResultError {
    fn from(err: DomainError) -> Self {
        match err.kind() {
            ErrorKind::Validation => ResultError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorKind::Conflict => ResultError::Conflict(err.message),
            ErrorKind::Timeout | ErrorKind::Remote => ResultError::Upstream {
                code: err.code,
                message: err.message,
            },
            _ => ResultError::Infrastructure(err.to_string()),
        }
    }
}

/// Status recomputation runs after every write; its failures surface here.
impl From<SampleError> for ResultError {
    fn from(err: SampleError) -> Self {
        match err {
            SampleError::NotFound(id) => ResultError::SampleNotFound(id),
            SampleError::ValidationFailed { field, message } => {
                ResultError::ValidationFailed { field, message }
            }
            SampleError::Upstream { code, message } => ResultError::Upstream { code, message },
            SampleError::Infrastructure(message) => ResultError::Infrastructure(message),
            other => ResultError::Conflict(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_test_is_validation() {
        let err = ResultError::TestNotAssigned {
            sample_id: SampleId::new(),
            test_id: TestId::new(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn sample_not_ready_is_conflict() {
        assert_eq!(
            ResultError::SampleNotReady("Pending".into()).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn sample_not_found_carries_over() {
        let id = SampleId::new();
        let err: ResultError = SampleError::NotFound(id).into();
        assert!(matches!(err, ResultError::SampleNotFound(found) if found == id));
    }

    #[test]
    fn non_numeric_value_maps_to_validation() {
        let err: ResultError = DomainError::validation("resultValue", "not numeric").into();
        assert!(matches!(err, ResultError::ValidationFailed { ref field, .. } if field == "resultValue"));
    }
}
