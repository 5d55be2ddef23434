//! PostgreSQL implementation of ReleaseRepository.
//!
//! `sample_id` is unique, so concurrent submissions for one sample resolve
//! in the database. Decision writes are guarded on `decision = 'pending'`
//! plus the expected version; the checklist and the QC result snapshot are
//! stored as JSONB alongside the release row.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{
    column, corrupt, db_error, document_number, enumeration, next_sequence, optional_timestamp,
    optional_user, timestamp, user,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, ReleaseId, SampleId, RELEASE_NUMBER_PREFIX,
};
use crate::domain::release::{
    ChecklistItem, Decision, DeliveryStatus, QcResultSnapshot, Release, ReleaseStatus,
};
use crate::domain::sample::{SourceRef, SourceType};
use crate::ports::{InsertOutcome, ReleaseRepository};

/// PostgreSQL implementation of ReleaseRepository.
#[derive(Clone)]
pub struct PostgresReleaseRepository {
    pool: PgPool,
}

impl PostgresReleaseRepository {
    /// Creates a new PostgresReleaseRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        id: &Uuid,
    ) -> Result<Option<Release>, DomainError> {
        let row = sqlx::query(&format!("SELECT * FROM qa_releases WHERE {} = $1", clause))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch release"))?;

        row.as_ref().map(row_to_release).transpose()
    }
}

#[async_trait]
impl ReleaseRepository for PostgresReleaseRepository {
    async fn next_sequence(&self, year: i32) -> Result<u32, DomainError> {
        next_sequence(&self.pool, RELEASE_NUMBER_PREFIX, year).await
    }

    async fn insert_unique(&self, release: &Release) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO qa_releases (
                id, release_number, sample_id, sample_number, entity_type, entity_id,
                entity_reference, material_name, batch_number, status, decision,
                checklist, results, remarks, submitted_by, submitted_at, reviewed_by,
                reviewed_at, decided_by, decided_at, due_date, delivery_status,
                delivery_attempts, last_delivery_error, delivered_at, version, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            ON CONFLICT (sample_id) DO NOTHING
            "#,
        )
        .bind(release.id().as_uuid())
        .bind(release.release_number().as_str())
        .bind(release.sample_id().as_uuid())
        .bind(release.sample_number().as_str())
        .bind(release.entity().source_type.as_str())
        .bind(&release.entity().source_id)
        .bind(release.entity().source_reference.as_deref())
        .bind(release.material_name())
        .bind(release.batch_number())
        .bind(release.status().as_str())
        .bind(release.decision().as_str())
        .bind(Json(release.checklist()))
        .bind(Json(release.results()))
        .bind(release.remarks())
        .bind(release.submitted_by().as_str())
        .bind(release.submitted_at().as_datetime())
        .bind(release.reviewed_by().map(|u| u.as_str()))
        .bind(release.reviewed_at().map(|t| *t.as_datetime()))
        .bind(release.decided_by().map(|u| u.as_str()))
        .bind(release.decided_at().map(|t| *t.as_datetime()))
        .bind(release.due_date().as_datetime())
        .bind(release.delivery_status().as_str())
        .bind(release.delivery_attempts())
        .bind(release.last_delivery_error())
        .bind(release.delivered_at().map(|t| *t.as_datetime()))
        .bind(release.version())
        .bind(release.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert release"))?;

        if result.rows_affected() > 0 {
            return Ok(InsertOutcome::Inserted);
        }

        match self.find_by_sample(release.sample_id()).await? {
            Some(existing) => Ok(InsertOutcome::Existing(existing)),
            None => Err(DomainError::database(format!(
                "Release for sample {} conflicted but could not be read back",
                release.sample_number()
            ))),
        }
    }

    async fn update_pending(&self, release: &Release) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE qa_releases SET
                status = $3,
                decision = $4,
                checklist = $5,
                remarks = $6,
                reviewed_by = $7,
                reviewed_at = $8,
                decided_by = $9,
                decided_at = $10,
                delivery_status = $11,
                version = $2,
                updated_at = $12
            WHERE id = $1 AND decision = 'pending' AND version = $2 - 1
            "#,
        )
        .bind(release.id().as_uuid())
        .bind(release.version())
        .bind(release.status().as_str())
        .bind(release.decision().as_str())
        .bind(Json(release.checklist()))
        .bind(release.remarks())
        .bind(release.reviewed_by().map(|u| u.as_str()))
        .bind(release.reviewed_at().map(|t| *t.as_datetime()))
        .bind(release.decided_by().map(|u| u.as_str()))
        .bind(release.decided_at().map(|t| *t.as_datetime()))
        .bind(release.delivery_status().as_str())
        .bind(release.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("update release"))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let stored = self
            .find_by_id(release.id())
            .await?
            .ok_or_else(|| not_found(release.id()))?;
        if stored.decision().is_terminal() {
            return Err(DomainError::new(
                ErrorCode::DecisionAlreadyRecorded,
                format!(
                    "Release {} is already decided ({})",
                    stored.release_number(),
                    stored.decision()
                ),
            ));
        }
        Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            format!("Release {} was modified concurrently", stored.release_number()),
        ))
    }

    async fn record_delivery(&self, release: &Release) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE qa_releases SET
                delivery_status = $2,
                delivery_attempts = $3,
                last_delivery_error = $4,
                delivered_at = $5,
                updated_at = $6
            WHERE id = $1 AND delivery_status <> 'delivered'
            "#,
        )
        .bind(release.id().as_uuid())
        .bind(release.delivery_status().as_str())
        .bind(release.delivery_attempts())
        .bind(release.last_delivery_error())
        .bind(release.delivered_at().map(|t| *t.as_datetime()))
        .bind(release.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("record delivery"))?;

        if result.rows_affected() == 0 && self.find_by_id(release.id()).await?.is_none() {
            return Err(not_found(release.id()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ReleaseId) -> Result<Option<Release>, DomainError> {
        self.fetch_one_where("id", id.as_uuid()).await
    }

    async fn find_by_sample(&self, sample_id: SampleId) -> Result<Option<Release>, DomainError> {
        self.fetch_one_where("sample_id", sample_id.as_uuid()).await
    }

    async fn list_pending_delivery(&self) -> Result<Vec<Release>, DomainError> {
        let rows = sqlx::query(
            "SELECT * FROM qa_releases WHERE delivery_status = 'pending' ORDER BY decided_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch releases pending delivery"))?;

        rows.iter().map(row_to_release).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn not_found(id: ReleaseId) -> DomainError {
    DomainError::new(ErrorCode::ReleaseNotFound, format!("Release not found: {}", id))
}

fn row_to_release(row: &PgRow) -> Result<Release, DomainError> {
    let id: Uuid = column(row, "id")?;
    let sample_id: Uuid = column(row, "sample_id")?;
    let checklist: Json<Vec<ChecklistItem>> = column(row, "checklist")?;
    let results: Json<Vec<QcResultSnapshot>> = column(row, "results")?;
    let delivery_attempts: i32 = column(row, "delivery_attempts")?;
    if delivery_attempts < 0 {
        return Err(corrupt("delivery_attempts", delivery_attempts));
    }

    let entity = SourceRef {
        source_type: enumeration(row, "entity_type", SourceType::parse)?,
        source_id: column(row, "entity_id")?,
        source_reference: column(row, "entity_reference")?,
    };

    Ok(Release::reconstitute(
        ReleaseId::from_uuid(id),
        document_number(row, "release_number")?,
        SampleId::from_uuid(sample_id),
        document_number(row, "sample_number")?,
        entity,
        column(row, "material_name")?,
        column(row, "batch_number")?,
        enumeration(row, "status", ReleaseStatus::parse)?,
        enumeration(row, "decision", Decision::parse)?,
        checklist.0,
        results.0,
        column(row, "remarks")?,
        user(row, "submitted_by")?,
        timestamp(row, "submitted_at")?,
        optional_user(row, "reviewed_by")?,
        optional_timestamp(row, "reviewed_at")?,
        optional_user(row, "decided_by")?,
        optional_timestamp(row, "decided_at")?,
        timestamp(row, "due_date")?,
        enumeration(row, "delivery_status", DeliveryStatus::parse)?,
        delivery_attempts,
        column(row, "last_delivery_error")?,
        optional_timestamp(row, "delivered_at")?,
        column(row, "version")?,
        timestamp(row, "updated_at")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_enum_values_parse() {
        for value in ["pending", "release", "reject", "hold"] {
            assert!(Decision::parse(value).is_some(), "{}", value);
        }
        for value in ["not_required", "pending", "delivered"] {
            assert!(DeliveryStatus::parse(value).is_some(), "{}", value);
        }
        assert!(Decision::parse("approved").is_none());
    }
}
