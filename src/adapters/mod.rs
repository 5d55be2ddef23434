//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event publishers (in-memory capture, structured audit log)
//! - `memory` - In-memory repositories
//! - `postgres` - PostgreSQL repositories
//! - `gateway` - Cross-service request/reply (in-process, HTTP)
//! - `messaging` - Service dispatchers mapping message patterns to handlers
//! - `http` - The axum message endpoint

pub mod events;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod messaging;
pub mod postgres;

pub use events::{InMemoryEventBus, TracingEventPublisher};
pub use gateway::{GatewayDispositionSink, GatewayQcReader, GatewayTestCatalog, HttpGateway, InProcessGateway};
pub use messaging::{CatalogService, QaService, QcService};
