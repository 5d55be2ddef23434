//! PostgreSQL implementation of TestRepository.
//!
//! A test and its specification rows are written in one transaction; the
//! specification set is replaced wholesale on every update.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::rows::{column, db_error, timestamp};
use crate::domain::catalog::{Specification, TestDefinition};
use crate::domain::foundation::{DomainError, ErrorCode, SpecificationId, TestId};
use crate::ports::TestRepository;

const TEST_COLUMNS: &str = r#"
    id, name, code, category, description, is_active, material_ids, created_at, updated_at
"#;

/// PostgreSQL implementation of TestRepository.
#[derive(Clone)]
pub struct PostgresTestRepository {
    pool: PgPool,
}

impl PostgresTestRepository {
    /// Creates a new PostgresTestRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, rows: Vec<PgRow>) -> Result<Vec<TestDefinition>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids = rows
            .iter()
            .map(|row| column::<Uuid>(row, "id"))
            .collect::<Result<Vec<_>, _>>()?;

        let spec_rows = sqlx::query(
            r#"
            SELECT id, test_id, parameter, min_value, max_value, target_value, unit, method
            FROM qc_specifications
            WHERE test_id = ANY($1)
            ORDER BY test_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch specifications"))?;

        let mut specs: HashMap<Uuid, Vec<Specification>> = HashMap::new();
        for row in &spec_rows {
            let test_id: Uuid = column(row, "test_id")?;
            specs.entry(test_id).or_default().push(row_to_specification(row)?);
        }

        rows.iter()
            .map(|row| {
                let id: Uuid = column(row, "id")?;
                row_to_test(row, specs.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

#[async_trait]
impl TestRepository for PostgresTestRepository {
    async fn insert(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        if unique_code {
            ensure_code_free(&mut tx, test).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO qc_tests (
                id, name, code, category, description, is_active, material_ids,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(test.id().as_uuid())
        .bind(test.name())
        .bind(test.code())
        .bind(test.category())
        .bind(test.description())
        .bind(test.is_active())
        .bind(test.material_ids())
        .bind(test.created_at().as_datetime())
        .bind(test.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("insert test"))?;

        write_specifications(&mut tx, test).await?;

        tx.commit().await.map_err(db_error("commit transaction"))?;
        Ok(())
    }

    async fn update(&self, test: &TestDefinition, unique_code: bool) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        if unique_code {
            ensure_code_free(&mut tx, test).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE qc_tests SET
                name = $2,
                code = $3,
                category = $4,
                description = $5,
                is_active = $6,
                material_ids = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(test.id().as_uuid())
        .bind(test.name())
        .bind(test.code())
        .bind(test.category())
        .bind(test.description())
        .bind(test.is_active())
        .bind(test.material_ids())
        .bind(test.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("update test"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TestNotFound,
                format!("Test not found: {}", test.id()),
            ));
        }

        sqlx::query("DELETE FROM qc_specifications WHERE test_id = $1")
            .bind(test.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("clear specifications"))?;
        write_specifications(&mut tx, test).await?;

        tx.commit().await.map_err(db_error("commit transaction"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: TestId) -> Result<Option<TestDefinition>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM qc_tests WHERE id = $1", TEST_COLUMNS))
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("fetch test"))?;
        Ok(self.load(rows).await?.into_iter().next())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<TestDefinition>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM qc_tests WHERE code = $1 ORDER BY created_at LIMIT 1",
            TEST_COLUMNS
        ))
        .bind(code.trim().to_ascii_uppercase())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch test by code"))?;
        Ok(self.load(rows).await?.into_iter().next())
    }

    async fn find_active_for_material(
        &self,
        material_id: &str,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM qc_tests WHERE is_active AND $1 = ANY(material_ids) ORDER BY code",
            TEST_COLUMNS
        ))
        .bind(material_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch tests for material"))?;
        self.load(rows).await
    }

    async fn find_active_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM qc_tests WHERE is_active AND lower(category) = lower($1) ORDER BY code",
            TEST_COLUMNS
        ))
        .bind(category.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch tests by category"))?;
        self.load(rows).await
    }

    async fn delete(&self, id: TestId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM qc_tests WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete test"))?;
        Ok(result.rows_affected() > 0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Serializes writers of the same code for the rest of the transaction,
/// then checks no other test already holds it.
async fn ensure_code_free(
    tx: &mut Transaction<'_, Postgres>,
    test: &TestDefinition,
) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(test.code())
        .execute(&mut **tx)
        .await
        .map_err(db_error("lock test code"))?;

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM qc_tests WHERE code = $1 AND id <> $2)",
    )
    .bind(test.code())
    .bind(test.id().as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("check test code"))?;

    if taken {
        return Err(DomainError::new(
            ErrorCode::DuplicateTestCode,
            format!("Test code '{}' already exists", test.code()),
        )
        .with_detail("code", test.code()));
    }
    Ok(())
}

async fn write_specifications(
    tx: &mut Transaction<'_, Postgres>,
    test: &TestDefinition,
) -> Result<(), DomainError> {
    for (position, spec) in test.specifications().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO qc_specifications (
                id, test_id, position, parameter, min_value, max_value, target_value,
                unit, method
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(spec.id().as_uuid())
        .bind(test.id().as_uuid())
        .bind(position as i32)
        .bind(spec.parameter())
        .bind(spec.min_value())
        .bind(spec.max_value())
        .bind(spec.target_value())
        .bind(spec.unit())
        .bind(spec.method())
        .execute(&mut **tx)
        .await
        .map_err(db_error("insert specification"))?;
    }
    Ok(())
}

fn row_to_specification(row: &PgRow) -> Result<Specification, DomainError> {
    let id: Uuid = column(row, "id")?;
    let min_value: Option<Decimal> = column(row, "min_value")?;
    let max_value: Option<Decimal> = column(row, "max_value")?;
    let target_value: Option<Decimal> = column(row, "target_value")?;

    Ok(Specification::reconstitute(
        SpecificationId::from_uuid(id),
        column(row, "parameter")?,
        min_value,
        max_value,
        target_value,
        column(row, "unit")?,
        column(row, "method")?,
    ))
}

fn row_to_test(row: &PgRow, specifications: Vec<Specification>) -> Result<TestDefinition, DomainError> {
    let id: Uuid = column(row, "id")?;

    Ok(TestDefinition::reconstitute(
        TestId::from_uuid(id),
        column(row, "name")?,
        column(row, "code")?,
        column(row, "category")?,
        column(row, "description")?,
        column(row, "is_active")?,
        column(row, "material_ids")?,
        specifications,
        timestamp(row, "created_at")?,
        timestamp(row, "updated_at")?,
    ))
}
