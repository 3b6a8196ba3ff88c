//! # REST API Interface Layer
//!
//! Provides HTTP REST endpoints for the gig tracker.
//! This layer handles:
//! - HTTP request/response serialization and deserialization
//! - Identity extraction from request headers
//! - Error translation from domain to HTTP status codes
//!
//! Handlers hold no business logic: they map DTOs to commands, call a
//! service, and map the result back.

pub mod accrual_apis;
pub mod data_transfer_apis;
pub mod goal_apis;
pub mod identity;
pub mod mappers;
pub mod session_apis;
pub mod transaction_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::domain::errors::{AccrualError, DomainError};

/// Status code for a service error
pub fn status_for(e: &anyhow::Error) -> StatusCode {
    if let Some(domain) = e.downcast_ref::<DomainError>() {
        return match domain {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        };
    }
    if let Some(accrual) = e.downcast_ref::<AccrualError>() {
        return match accrual {
            AccrualError::Validation(_) => StatusCode::BAD_REQUEST,
            AccrualError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccrualError::StoreRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Build the JSON error response for a failed operation.
///
/// Internal errors are logged in full and answered with `context` only.
pub fn error_response(context: &str, e: anyhow::Error) -> Response {
    let status = status_for(&e);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}: {:?}", context, e);
        context.to_string()
    } else {
        warn!("{}: {}", context, e);
        e.to_string()
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    use crate::domain::clock::FixedClock;
    use crate::domain::goal_accrual::AccrualPolicy;
    use crate::domain::notification::TracingNotificationSink;
    use crate::domain::time_window::{WeekStart, WindowCalculator, WindowZone};
    use crate::domain::user_context::UserContext;
    use crate::storage::MemoryStore;
    use crate::AppState;

    pub fn test_app_state() -> (AppState<MemoryStore>, FixedClock) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap());
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(clock.clone()),
            WindowCalculator::new(WindowZone::from_offset_minutes(Some(-180)).unwrap(), WeekStart::Monday),
            Arc::new(TracingNotificationSink),
            AccrualPolicy::default(),
        );
        (state, clock)
    }

    pub fn driver() -> UserContext {
        UserContext::authenticated("driver-1")
    }
}
