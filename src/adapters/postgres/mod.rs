//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTestRepository` - Test catalog with specification rows
//! - `PostgresSampleRepository` - Samples, assigned tests, number sequences
//! - `PostgresResultRepository` - One result row per (sample, test)
//! - `PostgresReleaseRepository` - Releases, unique per sample
//!
//! The schema lives in `migrations/` and is applied by [`migrate`].

mod release_repository;
mod result_repository;
mod rows;
mod sample_repository;
mod test_repository;

use sqlx::PgPool;

use crate::domain::foundation::DomainError;

pub use release_repository::PostgresReleaseRepository;
pub use result_repository::PostgresResultRepository;
pub use sample_repository::PostgresSampleRepository;
pub use test_repository::PostgresTestRepository;

/// Applies pending schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
}
