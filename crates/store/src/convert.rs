//! Column codecs shared by the stores
//!
//! Decimals and timestamps are TEXT columns; enums round-trip through
//! their snake_case string form.

use chrono::{DateTime, Utc};
use fourmiz_core::StoreError;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("bad decimal: {value}")))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("bad timestamp: {value}")))
}

pub(crate) fn parse_opt_timestamp(
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_enum<T>(value: &str) -> Result<T, StoreError>
where
    T: FromStr,
{
    value
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("bad enum value: {value}")))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
