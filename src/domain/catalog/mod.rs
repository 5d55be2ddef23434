//! Test catalog domain module.
//!
//! Owns laboratory test definitions and their numeric specifications. This is
//! the leaf of the release pipeline: it depends on nothing else in it.
//!
//! # Events
//!
//! - `TestCreated` - Published when a test definition is created
//! - `TestUpdated` - Published when a definition or its specifications change
//! - `TestDeleted` - Published when a definition is hard-deleted

mod errors;
mod events;
mod specification;
mod test_definition;

pub use errors::CatalogError;
pub use events::{TestCreated, TestDeleted, TestUpdated};
pub use specification::{AcceptanceCriteria, Specification};
pub use test_definition::{
    SpecificationDraft, TestDefinition, TestDraft, TestPatch, DEFAULT_CATEGORY,
};

#[cfg(test)]
pub(crate) use test_definition::test_support;
