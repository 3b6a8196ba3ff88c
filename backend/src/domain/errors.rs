use thiserror::Error;

use crate::storage::StorageError;

/// Failures the REST layer maps onto status codes.
///
/// Services return `anyhow::Result`; anything that should not become a 500
/// is raised as one of these so callers can `downcast_ref` it.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Not authenticated")]
    Unauthenticated,
}

/// Failures that abort an accrual or sweep call before any goal is written.
///
/// Per-goal write failures are not errors of the call; they are reported in
/// the call's report and processing continues with the next goal.
#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("Invalid accrual: {0}")]
    Validation(String),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Failed to read goals: {0}")]
    StoreRead(#[source] StorageError),
}

