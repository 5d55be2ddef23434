//! Sample lifecycle domain module.
//!
//! Samples move `Pending → Received → InTesting → Completed`, with a
//! `Cancelled` side branch before any result exists. `InTesting` and
//! `Completed` are derived from the result set, never set by callers.
//!
//! # Events
//!
//! - `SampleCreated` - Published when a sample is opened
//! - `SampleReceived` - Published on physical receipt in the lab
//! - `SampleStatusChanged` - Published when recomputation changes status
//! - `SampleCancelled` - Published when a sample is cancelled

mod aggregate;
mod errors;
mod events;
mod priority;
mod source;
mod status;

pub use aggregate::{AssignedTest, MaterialInfo, Sample, SampleDraft, SamplePatch};
pub use errors::SampleError;
pub use events::{SampleCancelled, SampleCreated, SampleReceived, SampleStatusChanged};
pub use priority::SamplePriority;
pub use source::{SourceRef, SourceType};
pub use status::SampleStatus;

#[cfg(test)]
pub(crate) use aggregate::test_support;
