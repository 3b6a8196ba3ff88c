//! # REST API for Work Sessions
//!
//! Start, complete, list and delete work sessions. Completing a session with
//! earnings credits them to income goals.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use tracing::info;

use crate::domain::commands::sessions::StartSessionCommand;
use crate::domain::user_context::UserContext;
use crate::io::rest::error_response;
use crate::io::rest::mappers::session_mapper::SessionMapper;
use crate::storage::Connection;
use crate::AppState;
use shared::{ActiveSessionResponse, CompleteSessionRequest, SessionListResponse, StartSessionRequest};

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_sessions::<C>).post(start_session::<C>))
        .route("/active", get(get_active_session::<C>))
        .route("/:id", delete(delete_session::<C>))
        .route("/:id/complete", post(complete_session::<C>))
}

pub async fn list_sessions<C: Connection>(State(state): State<AppState<C>>, user: UserContext) -> impl IntoResponse {
    info!("GET /api/sessions");

    let now = state.clock.now();
    match state.session_service.list_sessions(&user).await {
        Ok(sessions) => {
            let response = SessionListResponse {
                sessions: sessions.into_iter().map(|s| SessionMapper::to_dto(s, now)).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error listing sessions", e),
    }
}

pub async fn start_session<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Json(request): Json<StartSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/sessions - request: {:?}", request);

    let command = StartSessionCommand { notes: request.notes };
    match state.session_service.start_session(&user, command).await {
        Ok(session) => {
            let now = state.clock.now();
            (StatusCode::CREATED, Json(SessionMapper::to_dto(session, now))).into_response()
        }
        Err(e) => error_response("Error starting session", e),
    }
}

pub async fn get_active_session<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
) -> impl IntoResponse {
    info!("GET /api/sessions/active");

    let now = state.clock.now();
    match state.session_service.get_active_session(&user).await {
        Ok(session) => {
            let response = ActiveSessionResponse { session: session.map(|s| SessionMapper::to_dto(s, now)) };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error retrieving active session", e),
    }
}

pub async fn complete_session<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(session_id): Path<String>,
    Json(request): Json<CompleteSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/sessions/{}/complete - request: {:?}", session_id, request);

    let command = SessionMapper::to_complete_command(session_id, request);
    match state.session_service.complete_session(&user, command).await {
        Ok(result) => {
            let now = state.clock.now();
            (StatusCode::OK, Json(SessionMapper::to_complete_response(result, now))).into_response()
        }
        Err(e) => error_response("Error completing session", e),
    }
}

pub async fn delete_session<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/sessions/{}", session_id);

    match state.session_service.delete_session(&user, &session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting session", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{driver, test_app_state};

    #[tokio::test]
    async fn test_session_lifecycle_api() {
        let (state, _clock) = test_app_state();

        let response = start_session(State(state.clone()), driver(), Json(StartSessionRequest::default())).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);

        let response = start_session(State(state.clone()), driver(), Json(StartSessionRequest::default())).await;
        assert_eq!(response.into_response().status(), StatusCode::CONFLICT);

        let active = state.session_service.get_active_session(&driver()).await.unwrap().unwrap();
        let request = CompleteSessionRequest { earnings: 95.0, distance_km: 40.0, rides: 6, notes: None };
        let response = complete_session(State(state.clone()), driver(), Path(active.id.clone()), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = get_active_session(State(state.clone()), driver()).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        assert!(state.session_service.get_active_session(&driver()).await.unwrap().is_none());

        let response = delete_session(State(state.clone()), driver(), Path(active.id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_complete_unknown_session_is_not_found() {
        let (state, _clock) = test_app_state();
        let request = CompleteSessionRequest { earnings: 1.0, distance_km: 1.0, rides: 1, notes: None };
        let response = complete_session(State(state), driver(), Path("session::nope".into()), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
