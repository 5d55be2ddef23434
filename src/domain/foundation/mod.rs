//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the event/command
//! infrastructure shared by the catalog, QC and QA domains.

mod command;
mod document_number;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use document_number::{DocumentNumber, RELEASE_NUMBER_PREFIX, SAMPLE_NUMBER_PREFIX};
pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{
    ChecklistItemId, ReleaseId, ResultId, SampleId, SpecificationId, TestId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
