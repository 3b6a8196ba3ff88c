//! # REST API for Goal Management
//!
//! Endpoints for creating, retrieving, updating, resetting and sweeping goals.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::user_context::UserContext;
use crate::io::rest::error_response;
use crate::io::rest::mappers::accrual_mapper::AccrualMapper;
use crate::io::rest::mappers::goal_mapper::GoalMapper;
use crate::storage::Connection;
use crate::AppState;
use shared::{CreateGoalRequest, UpdateGoalRequest};

/// Create a router for goal related APIs
pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_goals::<C>).post(create_goal::<C>))
        .route("/sweep", post(sweep_resets::<C>))
        .route("/:id", get(get_goal::<C>).put(update_goal::<C>).delete(delete_goal::<C>))
        .route("/:id/reset", post(reset_goal::<C>))
}

pub async fn list_goals<C: Connection>(State(state): State<AppState<C>>, user: UserContext) -> impl IntoResponse {
    info!("GET /api/goals");

    match state.goal_service.list_goals(&user).await {
        Ok(goals) => (StatusCode::OK, Json(GoalMapper::to_dto_list(goals))).into_response(),
        Err(e) => error_response("Error listing goals", e),
    }
}

pub async fn create_goal<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Json(request): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    info!("POST /api/goals - request: {:?}", request);

    let command = GoalMapper::to_create_command(request);
    match state.goal_service.create_goal(&user, command).await {
        Ok(goal) => (StatusCode::CREATED, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Error creating goal", e),
    }
}

pub async fn get_goal<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(goal_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/goals/{}", goal_id);

    match state.goal_service.get_goal(&user, &goal_id).await {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Error retrieving goal", e),
    }
}

pub async fn update_goal<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(goal_id): Path<String>,
    Json(request): Json<UpdateGoalRequest>,
) -> impl IntoResponse {
    info!("PUT /api/goals/{} - request: {:?}", goal_id, request);

    let command = GoalMapper::to_update_command(goal_id, request);
    match state.goal_service.update_goal(&user, command).await {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Error updating goal", e),
    }
}

pub async fn delete_goal<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(goal_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/goals/{}", goal_id);

    match state.goal_service.delete_goal(&user, &goal_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting goal", e),
    }
}

/// Zero one goal's progress now
pub async fn reset_goal<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(goal_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/goals/{}/reset", goal_id);

    match state.goal_service.reset_goal(&user, &goal_id).await {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Error resetting goal", e),
    }
}

/// Reset every goal whose window has rolled over
pub async fn sweep_resets<C: Connection>(State(state): State<AppState<C>>, user: UserContext) -> impl IntoResponse {
    info!("POST /api/goals/sweep");

    match state.accrual.sweep_resets(&user).await {
        Ok(report) => (StatusCode::OK, Json(AccrualMapper::sweep_to_dto(report))).into_response(),
        Err(e) => error_response("Error sweeping goal resets", e.into()),
    }
}
