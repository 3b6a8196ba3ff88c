//! Transaction service domain logic for the gig tracker.
//!
//! Income and expense entries plus window summaries. Creating a transaction
//! never touches goals; crediting goals is the caller's decision.
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::transactions::{
    CreateTransactionCommand, TransactionListQuery, TransactionSummary, TransactionSummaryQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::models::transaction::{Transaction, TransactionTotals};
use crate::domain::time_window::WindowCalculator;
use crate::domain::user_context::UserContext;
use crate::storage::{Connection, TransactionFilter, TransactionStorage};

const MAX_DESCRIPTION_LENGTH: usize = 256;

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    windows: WindowCalculator,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>, windows: WindowCalculator, clock: Arc<dyn Clock>) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        Self { transaction_repository, windows, clock }
    }

    pub async fn create_transaction(
        &self,
        ctx: &UserContext,
        command: CreateTransactionCommand,
    ) -> Result<Transaction> {
        let owner_id = ctx.require_owner()?;

        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(DomainError::Validation("Amount must be a finite positive number".to_string()).into());
        }
        let category = command.category.trim();
        if category.is_empty() {
            return Err(DomainError::Validation("Category cannot be empty".to_string()).into());
        }
        if command.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::Validation(format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            ))
            .into());
        }

        let now = self.clock.now();
        let transaction = Transaction {
            id: Transaction::generate_id(command.kind),
            kind: command.kind,
            amount: command.amount,
            category: category.to_string(),
            description: command.description.trim().to_string(),
            date: command.date.unwrap_or(now),
            created_at: now,
        };
        self.transaction_repository.store_transaction(owner_id, &transaction).await?;

        info!(
            "Created {} transaction {} of {:.2} in '{}'",
            transaction.kind, transaction.id, transaction.amount, transaction.category
        );
        Ok(transaction)
    }

    pub async fn get_transaction(&self, ctx: &UserContext, transaction_id: &str) -> Result<Transaction> {
        let owner_id = ctx.require_owner()?;
        self.transaction_repository
            .get_transaction(owner_id, transaction_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Transaction {}", transaction_id)).into())
    }

    /// List transactions, most recent first
    pub async fn list_transactions(
        &self,
        ctx: &UserContext,
        query: TransactionListQuery,
    ) -> Result<Vec<Transaction>> {
        let owner_id = ctx.require_owner()?;
        if let (Some(start), Some(end)) = (query.start, query.end) {
            if end <= start {
                return Err(DomainError::Validation("End date must be after start date".to_string()).into());
            }
        }

        let filter = TransactionFilter {
            start: query.start,
            end: query.end,
            kind: query.kind,
            limit: query.limit,
        };
        Ok(self.transaction_repository.list_transactions(owner_id, &filter).await?)
    }

    pub async fn delete_transaction(&self, ctx: &UserContext, transaction_id: &str) -> Result<()> {
        let owner_id = ctx.require_owner()?;
        if !self.transaction_repository.delete_transaction(owner_id, transaction_id).await? {
            return Err(DomainError::NotFound(format!("Transaction {}", transaction_id)).into());
        }
        info!("Deleted transaction: {}", transaction_id);
        Ok(())
    }

    /// Income, expense and net totals over the day/week/month containing `query.at`
    pub async fn summarize(&self, ctx: &UserContext, query: TransactionSummaryQuery) -> Result<TransactionSummary> {
        let owner_id = ctx.require_owner()?;
        let at = query.at.unwrap_or_else(|| self.clock.now());
        let start = self.windows.start_of(query.window, at);
        let end = self.windows.next_start(query.window, at);

        let filter = TransactionFilter { start: Some(start), end: Some(end), ..Default::default() };
        let transactions = self.transaction_repository.list_transactions(owner_id, &filter).await?;

        let mut totals = TransactionTotals::default();
        for transaction in &transactions {
            totals.add(transaction);
        }

        Ok(TransactionSummary { window: query.window, start, end, totals })
    }
}
