//! Result evaluator command and query handlers.

mod list_for_sample;
mod review_result;
mod submit_result;

pub use list_for_sample::{ListResultsHandler, ListResultsQuery};
pub use review_result::{ReviewResultCommand, ReviewResultHandler};
pub use submit_result::{SubmitResultCommand, SubmitResultHandler, SubmitResultResult};
