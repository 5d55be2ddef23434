//! In-memory repository adapters.
//!
//! Used when no database is configured and throughout the test suites.
//! Each repository owns an [`InMemoryStore`] whose `transaction` gives the
//! same commit-or-rollback guarantee as the PostgreSQL adapters.

mod release_repository;
mod result_repository;
mod sample_repository;
mod store;
mod test_repository;

pub use release_repository::InMemoryReleaseRepository;
pub use result_repository::InMemoryResultRepository;
pub use sample_repository::InMemorySampleRepository;
pub use store::InMemoryStore;
pub use test_repository::InMemoryTestRepository;
