//! # REST API for Goal Accrual
//!
//! Direct entry point for crediting earnings to goals, for screens that
//! record earnings outside of sessions and transactions.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::info;

use crate::domain::user_context::UserContext;
use crate::io::rest::error_response;
use crate::io::rest::mappers::accrual_mapper::AccrualMapper;
use crate::storage::Connection;
use crate::AppState;
use shared::ApplyEarningsRequest;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new().route("/", post(apply_earnings::<C>))
}

pub async fn apply_earnings<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Json(request): Json<ApplyEarningsRequest>,
) -> impl IntoResponse {
    info!("POST /api/accruals - request: {:?}", request);

    match state.accrual.apply_earnings(&user, request.amount, &request.category).await {
        Ok(report) => (StatusCode::OK, Json(AccrualMapper::report_to_dto(report))).into_response(),
        Err(e) => error_response("Error applying earnings", e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::goal::CreateGoalCommand;
    use crate::io::rest::test_support::{driver, test_app_state};

    #[tokio::test]
    async fn test_apply_earnings_api() {
        let (state, _clock) = test_app_state();
        let goal = state
            .goal_service
            .create_goal(
                &driver(),
                CreateGoalCommand {
                    name: "Monthly".into(),
                    category: "Receita".into(),
                    period: "monthly".into(),
                    target: 3000.0,
                },
            )
            .await
            .unwrap();

        let request = ApplyEarningsRequest { amount: 120.0, category: " receita".into() };
        let response = apply_earnings(State(state.clone()), driver(), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        assert_eq!(state.goal_service.get_goal(&driver(), &goal.id).await.unwrap().current, 120.0);
    }

    #[tokio::test]
    async fn test_apply_earnings_rejects_bad_input() {
        let (state, _clock) = test_app_state();

        let request = ApplyEarningsRequest { amount: -4.0, category: "receita".into() };
        let response = apply_earnings(State(state.clone()), driver(), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let request = ApplyEarningsRequest { amount: 4.0, category: "receita".into() };
        let response = apply_earnings(State(state), UserContext::anonymous(), Json(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
