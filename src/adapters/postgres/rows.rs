//! Row decoding helpers shared by the PostgreSQL repositories.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};

pub(super) fn db_error(context: &str, e: impl Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", context, e))
}

pub(super) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| db_error(&format!("get {}", name), e))
}

pub(super) fn timestamp_column(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    let value: DateTime<Utc> = column(row, name)?;
    Ok(Timestamp::from_datetime(value))
}

pub(super) fn optional_timestamp_column(
    row: &PgRow,
    name: &str,
) -> Result<Option<Timestamp>, DomainError> {
    let value: Option<DateTime<Utc>> = column(row, name)?;
    Ok(value.map(Timestamp::from_datetime))
}

/// Reads a text column and parses it into a domain enum.
pub(super) fn parsed_column<T>(row: &PgRow, name: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e| db_error(&format!("parse {} '{}'", name, raw), e))
}
