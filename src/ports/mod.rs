//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Repository Ports
//!
//! - `TestRepository` - Test definitions with their specifications (catalog)
//! - `SampleRepository` - Samples with their assigned tests (QC)
//! - `ResultRepository` - One result per (sample, test) pair (QC)
//! - `ReleaseRepository` - Releases, unique per sample (QA)
//!
//! ## Cross-Service Ports
//!
//! - `ServiceGateway` - Synchronous request/response across services
//! - `MessageHandler` - Inbound message-pattern endpoint of a service
//! - `TestCatalog` - QC's typed view of the catalog
//! - `QcReader` - QA's typed view of QC samples and results
//! - `DispositionSink` - QA decision delivery to inventory/batch
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events

mod disposition_sink;
mod event_publisher;
mod qc_reader;
mod release_repository;
mod result_repository;
mod sample_repository;
mod service_gateway;
mod test_catalog;
mod test_repository;

pub use disposition_sink::DispositionSink;
pub use event_publisher::EventPublisher;
pub use qc_reader::QcReader;
pub use release_repository::{InsertOutcome, ReleaseRepository};
pub use result_repository::ResultRepository;
pub use sample_repository::SampleRepository;
pub use service_gateway::{
    GatewayError, GatewayRequest, MessageHandler, ServiceError, ServiceGateway, ServiceTarget,
    UNKNOWN_PATTERN,
};
pub use test_catalog::TestCatalog;
pub use test_repository::TestRepository;
