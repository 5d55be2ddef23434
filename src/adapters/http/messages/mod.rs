//! Message endpoint: `POST /messages/:pattern` for every hosted service.

mod handlers;
mod routes;

pub use handlers::{status_for, MessagingAppState};
pub use routes::messaging_router;
