//! Domain events and the envelope they travel in.
//!
//! Every committed state change in the catalog, QC and QA services is
//! described by one event struct. Handlers wrap the event in an
//! [`EventEnvelope`] and hand it to an `EventPublisher`; subscribers never
//! see the struct itself, only the envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Identity and timing of a domain event.
pub trait DomainEvent: Send + Sync {
    /// Routing key, `<aggregate>.<verb>.v<N>`.
    fn event_type(&self) -> &'static str;

    fn aggregate_id(&self) -> String;

    /// `"Test"`, `"Sample"`, `"Result"` or `"Release"`.
    fn aggregate_type(&self) -> &'static str;

    fn occurred_at(&self) -> Timestamp;

    fn event_id(&self) -> EventId;
}

/// Blanket `to_envelope()` for events that serialize.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Implements [`DomainEvent`] from field names.
///
/// ```ignore
/// domain_event!(
///     SampleReceived,
///     event_type = "sample.received.v1",
///     aggregate_id = sample_id,
///     aggregate_type = "Sample",
///     occurred_at = received_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event:ident,
        event_type = $kind:expr,
        aggregate_id = $id:ident,
        aggregate_type = $aggregate:expr,
        occurred_at = $at:ident,
        event_id = $event_id:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event {
            fn event_type(&self) -> &'static str {
                $kind
            }

            fn aggregate_id(&self) -> String {
                self.$id.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $aggregate
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$at
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$event_id.clone()
            }
        }
    };
}

pub use crate::domain_event;

/// Event instance id; subscribers deduplicate on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request context copied from the command that produced the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Operator who issued the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// What publishers actually carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    /// Parsed from the `.vN` suffix of `event_type`.
    pub schema_version: u32,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Builds an envelope around an arbitrary payload, stamped now.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        Self {
            event_id: EventId::new(),
            schema_version: schema_version(&event_type),
            event_type,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Wraps a domain event, keeping its id and timestamp.
    ///
    /// The command has already committed by the time this runs, so an
    /// unserializable payload becomes `null` instead of an error.
    pub fn from_event<T>(event: &T) -> Self
    where
        T: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type();
        Self {
            event_id: event.event_id(),
            event_type: event_type.to_string(),
            schema_version: schema_version(event_type),
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            payload: serde_json::to_value(event).unwrap_or(JsonValue::Null),
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }
}

fn schema_version(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize)]
    struct SpecificationRevised {
        event_id: EventId,
        test_id: String,
        revised_at: Timestamp,
    }

    domain_event!(
        SpecificationRevised,
        event_type = "test.specification_revised.v2",
        aggregate_id = test_id,
        aggregate_type = "Test",
        occurred_at = revised_at,
        event_id = event_id
    );

    #[test]
    fn schema_version_comes_from_suffix() {
        assert_eq!(schema_version("sample.received.v1"), 1);
        assert_eq!(schema_version("release.decided.v12"), 12);
        assert_eq!(schema_version("release.decided"), 1);
    }

    #[test]
    fn envelope_keeps_event_identity() {
        let event = SpecificationRevised {
            event_id: EventId::new(),
            test_id: "test-9".to_string(),
            revised_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();

        assert_eq!(envelope.event_id, event.event_id);
        assert_eq!(envelope.occurred_at, event.revised_at);
        assert_eq!(envelope.event_type, "test.specification_revised.v2");
        assert_eq!(envelope.schema_version, 2);
        assert_eq!(envelope.aggregate_id, "test-9");
        assert_eq!(envelope.aggregate_type, "Test");
        assert_eq!(envelope.payload["test_id"], json!("test-9"));
    }

    #[test]
    fn metadata_is_omitted_until_set() {
        let bare = EventEnvelope::new("sample.created.v1", "s-1", "Sample", json!({}));
        let encoded = serde_json::to_value(&bare).unwrap();
        assert_eq!(encoded["metadata"], json!({}));

        let tagged = bare.with_correlation_id("corr-1").with_user_id("qa-lead");
        assert_eq!(tagged.metadata.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(tagged.metadata.user_id.as_deref(), Some("qa-lead"));
    }
}
