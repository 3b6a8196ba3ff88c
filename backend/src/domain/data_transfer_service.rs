//! Export and import of a user's complete data set.
//!
//! Import restores records verbatim. It never credits goals: imported income
//! and sessions were already accounted for where they were exported from.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::data_transfer::{ExportBundle, ImportResult, EXPORT_VERSION};
use crate::domain::errors::DomainError;
use crate::domain::user_context::UserContext;
use crate::storage::{Connection, GoalStorage, SessionStorage, TransactionFilter, TransactionStorage};

#[derive(Clone)]
pub struct DataTransferService<C: Connection> {
    goal_repository: C::GoalRepository,
    transaction_repository: C::TransactionRepository,
    session_repository: C::SessionRepository,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> DataTransferService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            goal_repository: connection.create_goal_repository(),
            transaction_repository: connection.create_transaction_repository(),
            session_repository: connection.create_session_repository(),
            clock,
        }
    }

    pub async fn export(&self, ctx: &UserContext) -> Result<ExportBundle> {
        let owner_id = ctx.require_owner()?;

        let bundle = ExportBundle {
            version: EXPORT_VERSION,
            exported_at: self.clock.now(),
            transactions: self
                .transaction_repository
                .list_transactions(owner_id, &TransactionFilter::default())
                .await?,
            sessions: self.session_repository.list_sessions(owner_id).await?,
            goals: self.goal_repository.list_goals(owner_id).await?,
        };

        info!(
            "Exported {} transactions, {} sessions, {} goals",
            bundle.transactions.len(),
            bundle.sessions.len(),
            bundle.goals.len()
        );
        Ok(bundle)
    }

    /// Store every record of the bundle, overwriting records with the same ID
    pub async fn import(&self, ctx: &UserContext, bundle: ExportBundle) -> Result<ImportResult> {
        let owner_id = ctx.require_owner()?;
        if bundle.version > EXPORT_VERSION {
            return Err(DomainError::Validation(format!(
                "Unsupported export version {} (newest supported is {})",
                bundle.version, EXPORT_VERSION
            ))
            .into());
        }
        validate_bundle(&bundle)?;

        let mut result = ImportResult::default();
        for transaction in &bundle.transactions {
            self.transaction_repository.put_transaction(owner_id, transaction).await?;
            result.transactions += 1;
        }
        for session in &bundle.sessions {
            self.session_repository.put_session(owner_id, session).await?;
            result.sessions += 1;
        }
        for goal in &bundle.goals {
            self.goal_repository.put_goal(owner_id, goal).await?;
            result.goals += 1;
        }

        info!(
            "Imported {} transactions, {} sessions, {} goals",
            result.transactions, result.sessions, result.goals
        );
        Ok(result)
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Reject a bundle holding any record the services would never have written.
/// Nothing is stored unless every record passes.
fn validate_bundle(bundle: &ExportBundle) -> Result<(), DomainError> {
    let invalid = |what: &str, id: &str, reason: &str| -> Result<(), DomainError> {
        Err(DomainError::Validation(format!("Imported {} '{}' {}", what, id, reason)))
    };

    for goal in &bundle.goals {
        if goal.id.trim().is_empty() {
            return invalid("goal", &goal.id, "has an empty id");
        }
        if goal.category.trim().is_empty() {
            return invalid("goal", &goal.id, "has an empty category");
        }
        if !is_non_negative(goal.current) || !is_non_negative(goal.target) {
            return invalid("goal", &goal.id, "must have finite, non-negative progress and target");
        }
    }
    for transaction in &bundle.transactions {
        if transaction.id.trim().is_empty() {
            return invalid("transaction", &transaction.id, "has an empty id");
        }
        if !transaction.amount.is_finite() || transaction.amount <= 0.0 {
            return invalid("transaction", &transaction.id, "must have a positive amount");
        }
    }
    for session in &bundle.sessions {
        if session.id.trim().is_empty() {
            return invalid("session", &session.id, "has an empty id");
        }
        if !is_non_negative(session.earnings) || !is_non_negative(session.distance_km) {
            return invalid("session", &session.id, "must have finite, non-negative earnings and distance");
        }
    }
    Ok(())
}
