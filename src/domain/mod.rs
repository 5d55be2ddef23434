//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Test definitions and specifications
//! - `sample` - QC sample lifecycle and assigned tests
//! - `result` - Result evaluation against specifications
//! - `release` - QA checklist, decision and disposition delivery

pub mod catalog;
pub mod foundation;
pub mod release;
pub mod result;
pub mod sample;
