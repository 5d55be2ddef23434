//! PostgreSQL implementation of ResultRepository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{column, db_error, optional_timestamp, optional_user, timestamp, user};
use crate::domain::foundation::{DomainError, ErrorCode, ResultId, SampleId, TestId};
use crate::domain::result::TestResult;
use crate::ports::ResultRepository;

/// PostgreSQL implementation of ResultRepository.
#[derive(Clone)]
pub struct PostgresResultRepository {
    pool: PgPool,
}

impl PostgresResultRepository {
    /// Creates a new PostgresResultRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultRepository for PostgresResultRepository {
    async fn upsert(&self, result: TestResult) -> Result<TestResult, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        // Holds off a concurrent cancellation until this insert commits.
        sqlx::query("SELECT 1 FROM qc_samples WHERE id = $1 FOR SHARE")
            .bind(result.sample_id().as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock sample"))?;

        // A resubmission keeps the row's identity and clears its review.
        let row = sqlx::query(
            r#"
            INSERT INTO qc_results (
                id, sample_id, test_id, parameter, result_value, numeric_value, unit,
                passed, deviation, tested_by, tested_at, reviewed_by, reviewed_at,
                revision, recorded_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL, NULL, $12, $13, $14)
            ON CONFLICT (sample_id, test_id) DO UPDATE SET
                parameter = EXCLUDED.parameter,
                result_value = EXCLUDED.result_value,
                numeric_value = EXCLUDED.numeric_value,
                unit = EXCLUDED.unit,
                passed = EXCLUDED.passed,
                deviation = EXCLUDED.deviation,
                tested_by = EXCLUDED.tested_by,
                tested_at = EXCLUDED.tested_at,
                reviewed_by = NULL,
                reviewed_at = NULL,
                revision = qc_results.revision + 1,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(result.id().as_uuid())
        .bind(result.sample_id().as_uuid())
        .bind(result.test_id().as_uuid())
        .bind(result.parameter())
        .bind(result.result_value())
        .bind(result.numeric_value())
        .bind(result.unit())
        .bind(result.passed())
        .bind(result.deviation())
        .bind(result.tested_by().as_str())
        .bind(result.tested_at().as_datetime())
        .bind(result.revision())
        .bind(result.recorded_at().as_datetime())
        .bind(result.updated_at().as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("upsert result"))?;

        let stored = row_to_result(&row)?;
        tx.commit().await.map_err(db_error("commit transaction"))?;
        Ok(stored)
    }

    async fn remove(&self, id: ResultId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM qc_results WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete result"))?;
        Ok(())
    }

    async fn update(&self, result: &TestResult) -> Result<(), DomainError> {
        let outcome = sqlx::query(
            r#"
            UPDATE qc_results SET
                reviewed_by = $2,
                reviewed_at = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(result.id().as_uuid())
        .bind(result.reviewed_by().map(|u| u.as_str()))
        .bind(result.reviewed_at().map(|t| *t.as_datetime()))
        .bind(result.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update result"))?;

        if outcome.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ResultNotFound,
                format!("Result not found: {}", result.id()),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ResultId) -> Result<Option<TestResult>, DomainError> {
        let row = sqlx::query("SELECT * FROM qc_results WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch result"))?;

        row.as_ref().map(row_to_result).transpose()
    }

    async fn list_for_sample(&self, sample_id: SampleId) -> Result<Vec<TestResult>, DomainError> {
        let rows = sqlx::query("SELECT * FROM qc_results WHERE sample_id = $1 ORDER BY recorded_at")
            .bind(sample_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("fetch results for sample"))?;

        rows.iter().map(row_to_result).collect()
    }
}

fn row_to_result(row: &PgRow) -> Result<TestResult, DomainError> {
    let id: Uuid = column(row, "id")?;
    let sample_id: Uuid = column(row, "sample_id")?;
    let test_id: Uuid = column(row, "test_id")?;
    let numeric_value: Option<Decimal> = column(row, "numeric_value")?;

    Ok(TestResult::reconstitute(
        ResultId::from_uuid(id),
        SampleId::from_uuid(sample_id),
        TestId::from_uuid(test_id),
        column(row, "parameter")?,
        column(row, "result_value")?,
        numeric_value,
        column(row, "unit")?,
        column(row, "passed")?,
        column(row, "deviation")?,
        user(row, "tested_by")?,
        timestamp(row, "tested_at")?,
        optional_user(row, "reviewed_by")?,
        optional_timestamp(row, "reviewed_at")?,
        column(row, "revision")?,
        timestamp(row, "recorded_at")?,
        timestamp(row, "updated_at")?,
    ))
}
