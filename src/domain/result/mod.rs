//! Result evaluator domain module.
//!
//! Evaluates reported values against a test's acceptance criteria and keeps
//! exactly one result per (sample, test) pair.

mod errors;
mod evaluation;
mod events;
mod test_result;

pub use errors::ResultError;
pub use evaluation::{evaluate, within, Evaluation};
pub use events::ResultRecorded;
pub use test_result::{ResultSubmission, TestResult};
