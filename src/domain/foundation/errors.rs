//! Error types for the domain layer.
//!
//! Every failure in the pipeline is classified into one of a small set of
//! [`ErrorKind`]s. The kind is what crosses service boundaries: callers use it
//! to decide whether to re-read state, fix their input, or retry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// Stable failure classification shared by every component and the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input. Never retried automatically.
    Validation,
    /// Referenced entity is absent.
    NotFound,
    /// State-machine precondition violated; the caller may re-read and decide.
    Conflict,
    /// A cross-service call did not answer in time. Outcome unknown.
    Timeout,
    /// A cross-service call failed on the remote side or in transport.
    Remote,
    /// Unexpected local failure (storage, serialization).
    Internal,
}

impl ErrorKind {
    /// True for transient failures a caller may retry against idempotent operations.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Remote)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Remote => "remote",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,
    OutOfRange,
    WriteProtectedField,

    // Not found errors
    TestNotFound,
    SampleNotFound,
    ResultNotFound,
    ReleaseNotFound,
    ChecklistItemNotFound,

    // Conflict errors
    InvalidStateTransition,
    DuplicateTestCode,
    TestsLocked,
    SampleNotCompleted,
    DecisionAlreadyRecorded,
    ConcurrentModification,

    // Cross-service errors
    GatewayTimeout,
    RemoteFailure,
    ServiceUnavailable,

    // Infrastructure errors
    DatabaseError,
    SerializationError,
    InternalError,
}

impl ErrorCode {
    /// Classifies this code into its error kind.
    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            ValidationFailed | EmptyField | InvalidFormat | OutOfRange | WriteProtectedField => {
                ErrorKind::Validation
            }
            TestNotFound | SampleNotFound | ResultNotFound | ReleaseNotFound
            | ChecklistItemNotFound => ErrorKind::NotFound,
            InvalidStateTransition | DuplicateTestCode | TestsLocked | SampleNotCompleted
            | DecisionAlreadyRecorded | ConcurrentModification => ErrorKind::Conflict,
            GatewayTimeout => ErrorKind::Timeout,
            RemoteFailure | ServiceUnavailable => ErrorKind::Remote,
            DatabaseError | SerializationError | InternalError => ErrorKind::Internal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::WriteProtectedField => "WRITE_PROTECTED_FIELD",
            ErrorCode::TestNotFound => "TEST_NOT_FOUND",
            ErrorCode::SampleNotFound => "SAMPLE_NOT_FOUND",
            ErrorCode::ResultNotFound => "RESULT_NOT_FOUND",
            ErrorCode::ReleaseNotFound => "RELEASE_NOT_FOUND",
            ErrorCode::ChecklistItemNotFound => "CHECKLIST_ITEM_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DuplicateTestCode => "DUPLICATE_TEST_CODE",
            ErrorCode::TestsLocked => "TESTS_LOCKED",
            ErrorCode::SampleNotCompleted => "SAMPLE_NOT_COMPLETED",
            ErrorCode::DecisionAlreadyRecorded => "DECISION_ALREADY_RECORDED",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::GatewayTimeout => "GATEWAY_TIMEOUT",
            ErrorCode::RemoteFailure => "REMOTE_FAILURE",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates an invalid state transition error.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidStateTransition, message)
    }

    /// Creates a storage failure error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the error kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
        };
        let field = err.field().to_string();
        DomainError::new(code, err.to_string()).with_detail("field", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("code");
        assert_eq!(format!("{}", err), "Field 'code' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("result_value", "not a number");
        assert_eq!(
            format!("{}", err),
            "Field 'result_value' has invalid format: not a number"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SampleNotFound, "Sample not found");
        assert_eq!(format!("{}", err), "[SAMPLE_NOT_FOUND] Sample not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::validation("quantity", "must be positive")
            .with_detail("reason", "negative");

        assert_eq!(err.details.get("field"), Some(&"quantity".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"negative".to_string()));
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("name").into();
        assert_eq!(err.code, ErrorCode::EmptyField);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.details.get("field"), Some(&"name".to_string()));
    }

    #[test]
    fn codes_classify_into_kinds() {
        assert_eq!(ErrorCode::TestNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::TestsLocked.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::DecisionAlreadyRecorded.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::GatewayTimeout.kind(), ErrorKind::Timeout);
        assert_eq!(ErrorCode::ServiceUnavailable.kind(), ErrorKind::Remote);
        assert_eq!(ErrorCode::DatabaseError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::Remote.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::Conflict.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::NotFound).unwrap(),
            "\"not_found\""
        );
    }
}
