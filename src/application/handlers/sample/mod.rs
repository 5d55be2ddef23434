//! Sample lifecycle command and query handlers.

mod cancel_sample;
mod create_from_source;
mod create_sample;
mod get_sample;
mod receive_sample;
mod recompute_status;
mod resolve;
mod update_sample;

pub use assign_tests::{AssignTestsCommand, AssignTestsHandler, AssignTestsResult};
pub use cancel_sample::{CancelSampleCommand, CancelSampleHandler};
pub use create_from_source::{CreateSampleFromSourceCommand, CreateSampleFromSourceHandler};
pub use create_sample::{CreateSampleCommand, CreateSampleHandler, CreateSampleResult};
pub use get_sample::{GetSampleHandler, GetSampleQuery};
pub use receive_sample::{ReceiveSampleCommand, ReceiveSampleHandler};
pub use recompute_status::{
    RecomputeStatusCommand, RecomputeStatusHandler, RecomputeStatusResult,
};
pub use update_sample::{UpdateSampleCommand, UpdateSampleHandler};
