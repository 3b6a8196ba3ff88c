//! # REST API for Data Export and Import

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::user_context::UserContext;
use crate::io::rest::error_response;
use crate::io::rest::mappers::data_transfer_mapper::DataTransferMapper;
use crate::storage::Connection;
use crate::AppState;
use shared::ExportBundle;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/export", get(export_data::<C>))
        .route("/import", post(import_data::<C>))
}

pub async fn export_data<C: Connection>(State(state): State<AppState<C>>, user: UserContext) -> impl IntoResponse {
    info!("GET /api/export");

    match state.data_transfer_service.export(&user).await {
        Ok(bundle) => {
            let now = state.clock.now();
            (StatusCode::OK, Json(DataTransferMapper::bundle_to_dto(bundle, now))).into_response()
        }
        Err(e) => error_response("Error exporting data", e),
    }
}

pub async fn import_data<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Json(bundle): Json<ExportBundle>,
) -> impl IntoResponse {
    info!(
        "POST /api/import - {} transactions, {} sessions, {} goals",
        bundle.transactions.len(),
        bundle.sessions.len(),
        bundle.goals.len()
    );

    let bundle = match DataTransferMapper::bundle_to_domain(bundle) {
        Ok(bundle) => bundle,
        Err(e) => return error_response("Invalid export bundle", e.into()),
    };
    match state.data_transfer_service.import(&user, bundle).await {
        Ok(result) => (StatusCode::OK, Json(DataTransferMapper::import_result_to_dto(result))).into_response(),
        Err(e) => error_response("Error importing data", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::Clock;
    use crate::domain::commands::goal::CreateGoalCommand;
    use crate::domain::user_context::UserContext;
    use crate::io::rest::test_support::{driver, test_app_state};

    #[tokio::test]
    async fn test_export_and_import_api() {
        let (state, clock) = test_app_state();
        state
            .goal_service
            .create_goal(
                &driver(),
                CreateGoalCommand { name: "Week".into(), category: "km".into(), period: "weekly".into(), target: 500.0 },
            )
            .await
            .unwrap();

        let bundle = DataTransferMapper::bundle_to_dto(
            state.data_transfer_service.export(&driver()).await.unwrap(),
            clock.now(),
        );
        assert_eq!(bundle.goals.len(), 1);

        let other = UserContext::authenticated("driver-2");
        let response = import_data(State(state.clone()), other.clone(), Json(bundle)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
        assert_eq!(state.goal_service.list_goals(&other).await.unwrap().len(), 1);

        let response = export_data(State(state), UserContext::anonymous()).await;
        assert_eq!(response.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
