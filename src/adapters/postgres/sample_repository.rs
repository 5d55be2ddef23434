//! PostgreSQL implementation of SampleRepository.
//!
//! Assigned tests live in `qc_sample_tests`; updates are version-checked so
//! a stale write fails instead of overwriting a concurrent one. Cancellation
//! additionally requires that no row in `qc_results` points at the sample.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::rows::{
    column, db_error, document_number, enumeration, next_sequence, optional_timestamp,
    optional_user, timestamp, user,
};
use crate::domain::foundation::{DomainError, ErrorCode, SampleId, TestId, SAMPLE_NUMBER_PREFIX};
use crate::domain::sample::{
    AssignedTest, MaterialInfo, Sample, SamplePriority, SampleStatus, SourceRef, SourceType,
};
use crate::ports::SampleRepository;

/// PostgreSQL implementation of SampleRepository.
#[derive(Clone)]
pub struct PostgresSampleRepository {
    pool: PgPool,
}

impl PostgresSampleRepository {
    /// Creates a new PostgresSampleRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Version-checked write. With `unless_results`, the row is locked first
    /// and the write only lands while `qc_results` has nothing for it.
    async fn write(&self, sample: &Sample, unless_results: bool) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        if unless_results {
            // Waits out any result insert holding a share lock on the row.
            sqlx::query("SELECT 1 FROM qc_samples WHERE id = $1 FOR UPDATE")
                .bind(sample.id().as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("lock sample"))?;
        }

        let result = sqlx::query(
            r#"
            UPDATE qc_samples SET
                batch_number = $3,
                quantity = $4,
                unit = $5,
                priority = $6,
                status = $7,
                assigned_to = $8,
                due_date = $9,
                received_at = $10,
                completed_at = $11,
                cancellation_reason = $12,
                version = $2,
                updated_at = $13
            WHERE id = $1 AND version = $2 - 1
              AND (NOT $14 OR NOT EXISTS (SELECT 1 FROM qc_results WHERE sample_id = $1))
            "#,
        )
        .bind(sample.id().as_uuid())
        .bind(sample.version())
        .bind(sample.batch_number())
        .bind(sample.quantity())
        .bind(sample.unit())
        .bind(sample.priority().as_str())
        .bind(sample.status().as_str())
        .bind(sample.assigned_to().map(|u| u.as_str()))
        .bind(sample.due_date().map(|t| *t.as_datetime()))
        .bind(sample.received_at().map(|t| *t.as_datetime()))
        .bind(sample.completed_at().map(|t| *t.as_datetime()))
        .bind(sample.cancellation_reason())
        .bind(sample.updated_at().as_datetime())
        .bind(unless_results)
        .execute(&mut *tx)
        .await
        .map_err(db_error("update sample"))?;

        if result.rows_affected() == 0 {
            if unless_results {
                let has_results: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM qc_results WHERE sample_id = $1)",
                )
                .bind(sample.id().as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("check sample results"))?;
                if has_results {
                    return Err(DomainError::invalid_transition(format!(
                        "Sample {} already has recorded results",
                        sample.sample_number()
                    )));
                }
            }

            let stored: Option<i64> =
                sqlx::query_scalar("SELECT version FROM qc_samples WHERE id = $1")
                    .bind(sample.id().as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("fetch sample version"))?;

            return Err(match stored {
                None => DomainError::new(
                    ErrorCode::SampleNotFound,
                    format!("Sample not found: {}", sample.id()),
                ),
                Some(version) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Sample {} is at version {}, write expected {}",
                        sample.sample_number(),
                        version,
                        sample.version() - 1
                    ),
                ),
            });
        }

        sqlx::query("DELETE FROM qc_sample_tests WHERE sample_id = $1")
            .bind(sample.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("clear assigned tests"))?;
        write_assigned_tests(&mut tx, sample).await?;

        tx.commit().await.map_err(db_error("commit transaction"))?;
        Ok(())
    }
}

#[async_trait]
impl SampleRepository for PostgresSampleRepository {
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError> {
        next_sequence(&self.pool, SAMPLE_NUMBER_PREFIX, year).await
    }

    async fn insert(&self, sample: &Sample) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO qc_samples (
                id, sample_number, source_type, source_id, source_reference,
                material_id, material_name, material_code, batch_number, quantity, unit,
                priority, status, assigned_to, requested_by, requested_at, due_date,
                received_at, completed_at, cancellation_reason, version, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            "#,
        )
        .bind(sample.id().as_uuid())
        .bind(sample.sample_number().as_str())
        .bind(sample.source().source_type.as_str())
        .bind(&sample.source().source_id)
        .bind(sample.source().source_reference.as_deref())
        .bind(&sample.material().material_id)
        .bind(&sample.material().material_name)
        .bind(sample.material().material_code.as_deref())
        .bind(sample.batch_number())
        .bind(sample.quantity())
        .bind(sample.unit())
        .bind(sample.priority().as_str())
        .bind(sample.status().as_str())
        .bind(sample.assigned_to().map(|u| u.as_str()))
        .bind(sample.requested_by().as_str())
        .bind(sample.requested_at().as_datetime())
        .bind(sample.due_date().map(|t| *t.as_datetime()))
        .bind(sample.received_at().map(|t| *t.as_datetime()))
        .bind(sample.completed_at().map(|t| *t.as_datetime()))
        .bind(sample.cancellation_reason())
        .bind(sample.version())
        .bind(sample.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("insert sample"))?;

        write_assigned_tests(&mut tx, sample).await?;

        tx.commit().await.map_err(db_error("commit transaction"))?;
        Ok(())
    }

    async fn update(&self, sample: &Sample) -> Result<(), DomainError> {
        self.write(sample, false).await
    }

    async fn cancel(&self, sample: &Sample) -> Result<(), DomainError> {
        self.write(sample, true).await
    }

    async fn find_by_id(&self, id: SampleId) -> Result<Option<Sample>, DomainError> {
        let row = sqlx::query("SELECT * FROM qc_samples WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch sample"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let test_rows = sqlx::query(
            r#"
            SELECT test_id, test_name, test_code, assigned_at
            FROM qc_sample_tests
            WHERE sample_id = $1
            ORDER BY assigned_at, test_code
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch assigned tests"))?;

        let assigned_tests = test_rows
            .iter()
            .map(row_to_assigned_test)
            .collect::<Result<Vec<_>, _>>()?;

        row_to_sample(&row, assigned_tests).map(Some)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

async fn write_assigned_tests(
    tx: &mut Transaction<'_, Postgres>,
    sample: &Sample,
) -> Result<(), DomainError> {
    for test in sample.assigned_tests() {
        sqlx::query(
            r#"
            INSERT INTO qc_sample_tests (sample_id, test_id, test_name, test_code, assigned_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sample.id().as_uuid())
        .bind(test.test_id.as_uuid())
        .bind(&test.test_name)
        .bind(&test.test_code)
        .bind(test.assigned_at.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(db_error("insert assigned test"))?;
    }
    Ok(())
}

fn row_to_assigned_test(row: &PgRow) -> Result<AssignedTest, DomainError> {
    let test_id: Uuid = column(row, "test_id")?;
    Ok(AssignedTest {
        test_id: TestId::from_uuid(test_id),
        test_name: column(row, "test_name")?,
        test_code: column(row, "test_code")?,
        assigned_at: timestamp(row, "assigned_at")?,
    })
}

fn row_to_sample(row: &PgRow, assigned_tests: Vec<AssignedTest>) -> Result<Sample, DomainError> {
    let id: Uuid = column(row, "id")?;
    let quantity: Decimal = column(row, "quantity")?;

    let source = SourceRef {
        source_type: enumeration(row, "source_type", SourceType::parse)?,
        source_id: column(row, "source_id")?,
        source_reference: column(row, "source_reference")?,
    };
    let material = MaterialInfo {
        material_id: column(row, "material_id")?,
        material_name: column(row, "material_name")?,
        material_code: column(row, "material_code")?,
    };

    Ok(Sample::reconstitute(
        SampleId::from_uuid(id),
        document_number(row, "sample_number")?,
        source,
        material,
        column(row, "batch_number")?,
        quantity,
        column(row, "unit")?,
        enumeration(row, "priority", SamplePriority::parse)?,
        enumeration(row, "status", SampleStatus::parse)?,
        optional_user(row, "assigned_to")?,
        user(row, "requested_by")?,
        timestamp(row, "requested_at")?,
        optional_timestamp(row, "due_date")?,
        optional_timestamp(row, "received_at")?,
        optional_timestamp(row, "completed_at")?,
        column(row, "cancellation_reason")?,
        assigned_tests,
        column(row, "version")?,
        timestamp(row, "updated_at")?,
    ))
}
