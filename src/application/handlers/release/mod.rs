//! Disposition coordinator command and query handlers.

mod decide;
mod deliver_disposition;
mod get_release;
mod retry_pending_deliveries;
mod submit_to_qa;
mod update_checklist;

pub use decide::{DecideCommand, DecideHandler, DecideResult};
pub use deliver_disposition::{DeliverDispositionCommand, DeliverDispositionHandler};
pub use get_release::{GetReleaseHandler, GetReleaseQuery};
pub use retry_pending_deliveries::{DeliveryAttempt, RetryPendingDeliveriesHandler};
pub use submit_to_qa::{SubmissionPolicy, SubmitToQaCommand, SubmitToQaHandler, SubmitToQaResult};
pub use update_checklist::{UpdateChecklistCommand, UpdateChecklistHandler};
