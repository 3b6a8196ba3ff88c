//! Conversions between `shared` DTOs and domain models.

pub mod accrual_mapper;
pub mod data_transfer_mapper;
pub mod goal_mapper;
pub mod session_mapper;
pub mod transaction_mapper;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::errors::DomainError;

pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp from a request, naming the field on failure.
pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DomainError::Validation(format!("Invalid {} '{}': {}", field, value, e)))
}

pub(crate) fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_timestamp(field, v))
        .transpose()
}
