//! QA release (disposition) domain module.
//!
//! A release gathers a completed sample's results and a reviewer checklist
//! into one terminal decision: Release, Reject or Hold. There is no path back
//! from a decision; a correction needs a new sample and release.
//!
//! # Events
//!
//! - `ReleaseSubmitted` - Published when a sample is submitted to QA
//! - `ReleaseDecided` - Published when the decision is recorded
//! - `DispositionDelivered` - Published when the owning domain confirmed it

mod aggregate;
mod checklist;
mod errors;
mod events;
mod status;

pub use aggregate::{DispositionEvent, Release, SubmittedSample};
pub use checklist::{ChecklistItem, QcResultSnapshot};
pub use errors::ReleaseError;
pub use events::{DispositionDelivered, ReleaseDecided, ReleaseSubmitted};
pub use status::{Decision, DeliveryStatus, ReleaseStatus};

#[cfg(test)]
pub(crate) use aggregate::test_support;
