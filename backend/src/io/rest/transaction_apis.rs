//! # REST API for Transactions
//!
//! Income/expense entry, listing, deletion and window summaries. This is the
//! transaction screen's entry point: when a new income asks for it, the
//! amount is also credited to goals of the same category.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{info, warn};

use crate::domain::commands::sessions::AccrualOutcome;
use crate::domain::models::transaction::{Transaction, TransactionKind};
use crate::domain::user_context::UserContext;
use crate::io::rest::error_response;
use crate::io::rest::mappers::accrual_mapper::AccrualMapper;
use crate::io::rest::mappers::transaction_mapper::TransactionMapper;
use crate::storage::Connection;
use crate::AppState;
use shared::{
    CreateTransactionRequest, CreateTransactionResponse, TransactionListRequest, TransactionListResponse,
    TransactionSummaryRequest,
};

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_transactions::<C>).post(create_transaction::<C>))
        .route("/summary", get(summarize_transactions::<C>))
        .route("/:id", get(get_transaction::<C>).delete(delete_transaction::<C>))
}

pub async fn list_transactions<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Query(request): Query<TransactionListRequest>,
) -> impl IntoResponse {
    info!("GET /api/transactions - query: {:?}", request);

    let query = match TransactionMapper::to_list_query(request) {
        Ok(query) => query,
        Err(e) => return error_response("Invalid transaction query", e.into()),
    };
    match state.transaction_service.list_transactions(&user, query).await {
        Ok(transactions) => {
            let response = TransactionListResponse {
                transactions: transactions.into_iter().map(TransactionMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Error listing transactions", e),
    }
}

pub async fn create_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions - request: {:?}", request);

    let command = match TransactionMapper::to_create_command(&request) {
        Ok(command) => command,
        Err(e) => return error_response("Invalid transaction", e.into()),
    };
    let transaction = match state.transaction_service.create_transaction(&user, command).await {
        Ok(transaction) => transaction,
        Err(e) => return error_response("Error creating transaction", e),
    };

    let accrual = if request.apply_to_goals {
        credit_goals(&state, &user, &transaction).await
    } else {
        AccrualOutcome::Skipped
    };

    let response = CreateTransactionResponse {
        transaction: TransactionMapper::to_dto(transaction),
        accrual: AccrualMapper::outcome_to_dto(accrual),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

/// Credit a saved income to goals; the transaction stands whatever happens here
async fn credit_goals<C: Connection>(
    state: &AppState<C>,
    user: &UserContext,
    transaction: &Transaction,
) -> AccrualOutcome {
    if transaction.kind != TransactionKind::Income {
        return AccrualOutcome::Skipped;
    }
    match state.accrual.apply_earnings(user, transaction.amount, &transaction.category).await {
        Ok(report) => AccrualOutcome::Applied(report),
        Err(e) => {
            warn!("Transaction {} saved but goals were not credited: {}", transaction.id, e);
            AccrualOutcome::Failed(e.to_string())
        }
    }
}

pub async fn summarize_transactions<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Query(request): Query<TransactionSummaryRequest>,
) -> impl IntoResponse {
    info!("GET /api/transactions/summary - query: {:?}", request);

    let query = match TransactionMapper::to_summary_query(request) {
        Ok(query) => query,
        Err(e) => return error_response("Invalid summary query", e.into()),
    };
    match state.transaction_service.summarize(&user, query).await {
        Ok(summary) => (StatusCode::OK, Json(TransactionMapper::to_summary_dto(summary))).into_response(),
        Err(e) => error_response("Error summarizing transactions", e),
    }
}

pub async fn get_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/transactions/{}", transaction_id);

    match state.transaction_service.get_transaction(&user, &transaction_id).await {
        Ok(transaction) => (StatusCode::OK, Json(TransactionMapper::to_dto(transaction))).into_response(),
        Err(e) => error_response("Error retrieving transaction", e),
    }
}

pub async fn delete_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    user: UserContext,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{}", transaction_id);

    match state.transaction_service.delete_transaction(&user, &transaction_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error deleting transaction", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::goal::CreateGoalCommand;
    use crate::io::rest::test_support::{driver, test_app_state};
    use shared::TransactionKind as SharedKind;

    fn income(amount: f64, apply_to_goals: bool) -> CreateTransactionRequest {
        CreateTransactionRequest {
            kind: SharedKind::Income,
            amount,
            category: "receita".into(),
            description: "airport run".into(),
            date: None,
            apply_to_goals,
        }
    }

    async fn daily_goal(state: &AppState<crate::storage::MemoryStore>) -> String {
        let command = CreateGoalCommand {
            name: "Daily".into(),
            category: "receita".into(),
            period: "daily".into(),
            target: 200.0,
        };
        state.goal_service.create_goal(&driver(), command).await.unwrap().id
    }

    #[tokio::test]
    async fn test_income_credits_goals_only_when_asked() {
        let (state, _clock) = test_app_state();
        let goal_id = daily_goal(&state).await;

        let response = create_transaction(State(state.clone()), driver(), Json(income(40.0, false))).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
        assert_eq!(state.goal_service.get_goal(&driver(), &goal_id).await.unwrap().current, 0.0);

        let response = create_transaction(State(state.clone()), driver(), Json(income(25.0, true))).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
        assert_eq!(state.goal_service.get_goal(&driver(), &goal_id).await.unwrap().current, 25.0);
    }

    #[tokio::test]
    async fn test_expenses_never_credit_goals() {
        let (state, _clock) = test_app_state();
        let goal_id = daily_goal(&state).await;

        let expense = CreateTransactionRequest { kind: SharedKind::Expense, ..income(15.0, true) };
        let response = create_transaction(State(state.clone()), driver(), Json(expense)).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
        assert_eq!(state.goal_service.get_goal(&driver(), &goal_id).await.unwrap().current, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_transaction_requests() {
        let (state, _clock) = test_app_state();

        let response = create_transaction(State(state.clone()), driver(), Json(income(0.0, true))).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let bad_date = CreateTransactionRequest { date: Some("tomorrow".into()), ..income(5.0, false) };
        let response = create_transaction(State(state.clone()), driver(), Json(bad_date)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let response = summarize_transactions(
            State(state),
            driver(),
            Query(TransactionSummaryRequest { window: "decade".into(), at: None }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_and_delete_transaction_api() {
        let (state, _clock) = test_app_state();
        let created = state
            .transaction_service
            .create_transaction(&driver(), TransactionMapper::to_create_command(&income(9.0, false)).unwrap())
            .await
            .unwrap();

        let response = get_transaction(State(state.clone()), driver(), Path(created.id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = delete_transaction(State(state.clone()), driver(), Path(created.id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);

        let response = delete_transaction(State(state), driver(), Path(created.id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
