//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers persist, then publish; query handlers only read.

pub mod handlers;

pub use handlers::catalog::{CreateTestCommand, CreateTestHandler, ListForMaterialHandler};
pub use handlers::release::{
    DecideCommand, DecideHandler, DeliverDispositionHandler, RetryPendingDeliveriesHandler,
    SubmissionPolicy, SubmitToQaCommand, SubmitToQaHandler,
};
pub use handlers::result::{SubmitResultCommand, SubmitResultHandler};
pub use handlers::sample::{CreateSampleCommand, CreateSampleHandler, ReceiveSampleHandler};
