//! HTTP adapters.
//!
//! Every service is reachable through one message endpoint; see [`messages`].

pub mod messages;

pub use messages::{messaging_router, MessagingAppState};
