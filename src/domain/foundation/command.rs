//! Per-request context passed to every command handler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Who issued a command and which request it belongs to.
///
/// Handlers stamp both onto the events they publish and forward the
/// correlation id on outbound gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub user_id: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandMetadata {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    /// Metadata for work the services start themselves (delivery retries).
    pub fn system() -> Self {
        Self::new(UserId::system())
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// The request's correlation id, or a fresh one when the caller sent none.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
impl CommandMetadata {
    pub fn test_fixture() -> Self {
        Self::new(UserId::new("test-user-123").unwrap()).with_correlation_id("test-correlation-id")
    }
}
