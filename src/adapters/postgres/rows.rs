//! Row decoding and shared SQL helpers for the PostgreSQL adapters.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};

use crate::domain::foundation::{DocumentNumber, DomainError, ErrorCode, Timestamp, UserId};

/// Wraps a sqlx error with what we were doing at the time.
pub(super) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", context, e))
}

pub(super) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    })
}

pub(super) fn timestamp(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    let value: DateTime<Utc> = column(row, name)?;
    Ok(Timestamp::from_datetime(value))
}

pub(super) fn optional_timestamp(row: &PgRow, name: &str) -> Result<Option<Timestamp>, DomainError> {
    let value: Option<DateTime<Utc>> = column(row, name)?;
    Ok(value.map(Timestamp::from_datetime))
}

pub(super) fn user(row: &PgRow, name: &str) -> Result<UserId, DomainError> {
    let value: String = column(row, name)?;
    UserId::new(value).map_err(|e| corrupt(name, e))
}

pub(super) fn optional_user(row: &PgRow, name: &str) -> Result<Option<UserId>, DomainError> {
    let value: Option<String> = column(row, name)?;
    value
        .map(|v| UserId::new(v).map_err(|e| corrupt(name, e)))
        .transpose()
}

pub(super) fn document_number(row: &PgRow, name: &str) -> Result<DocumentNumber, DomainError> {
    let value: String = column(row, name)?;
    DocumentNumber::parse(value).map_err(|e| corrupt(name, e))
}

/// Parses a stored enum column through its `parse` function.
pub(super) fn enumeration<T>(
    row: &PgRow,
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, DomainError> {
    let value: String = column(row, name)?;
    parse(&value).ok_or_else(|| corrupt(name, format!("unknown value '{}'", value)))
}

pub(super) fn corrupt(name: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {}: {}", name, reason),
    )
}

/// Allocates the next per-year sequence for a document prefix.
///
/// The upsert takes a row lock, so concurrent allocations for the same year
/// serialize and never hand out the same value.
pub(super) async fn next_sequence(
    pool: &PgPool,
    prefix: &str,
    year: i32,
) -> Result<u32, DomainError> {
    let value: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO document_sequences (prefix, year, last_value)
        VALUES ($1, $2, 1)
        ON CONFLICT (prefix, year)
        DO UPDATE SET last_value = document_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(prefix)
    .bind(year)
    .fetch_one(pool)
    .await
    .map_err(db_error("allocate document sequence"))?;

    u32::try_from(value).map_err(|e| corrupt("last_value", e))
}
