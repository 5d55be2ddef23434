//! Event publishing adapters.
//!
//! - `InMemoryEventBus` - captures events for assertions in tests
//! - `TracingEventPublisher` - writes events to the structured audit log

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryEventBus;
pub use tracing_publisher::TracingEventPublisher;
