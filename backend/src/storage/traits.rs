//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! Every operation is scoped to one owner (user). A single call is atomic
//! with respect to the record it touches; nothing here spans records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::{StorageError, StorageResult};
use crate::domain::models::goal::{Goal, GoalPatch};
use crate::domain::models::session::WorkSession;
use crate::domain::models::transaction::{Transaction, TransactionKind};

/// Precondition attached to a goal update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Last write wins
    Unconditional,
    /// Only apply if the stored revision still equals this value
    Revision(u64),
}

/// Trait defining the interface for goal storage operations
#[async_trait]
pub trait GoalStorage: Send + Sync {
    /// Insert a new goal. Fails with `AlreadyExists` if the ID is taken.
    async fn store_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()>;

    /// Insert or overwrite a goal record verbatim (used by data import)
    async fn put_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()>;

    /// List all goals of an owner, oldest first
    async fn list_goals(&self, owner_id: &str) -> StorageResult<Vec<Goal>>;

    /// Retrieve a specific goal by ID
    async fn get_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<Option<Goal>>;

    /// Apply a partial update to one goal and bump its revision.
    /// Returns the stored goal after the write.
    async fn update_goal(
        &self,
        owner_id: &str,
        goal_id: &str,
        patch: &GoalPatch,
        condition: WriteCondition,
    ) -> StorageResult<Goal>;

    /// Delete a goal. Returns true if it existed.
    async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<bool>;
}

/// Filter for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Inclusive lower bound on `date`
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date`
    pub end: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.start.map_or(true, |start| transaction.date >= start)
            && self.end.map_or(true, |end| transaction.date < end)
            && self.kind.map_or(true, |kind| transaction.kind == kind)
    }

    /// Filter, order most recent first and truncate to the limit.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let mut selected: Vec<Transaction> =
            transactions.into_iter().filter(|t| self.matches(t)).collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Trait defining the interface for transaction storage operations
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction
    async fn store_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()>;

    /// Insert or overwrite a transaction (used by data import)
    async fn put_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()>;

    /// Retrieve a specific transaction by ID
    async fn get_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<Option<Transaction>>;

    /// List transactions matching the filter, most recent first
    async fn list_transactions(&self, owner_id: &str, filter: &TransactionFilter) -> StorageResult<Vec<Transaction>>;

    /// Delete a single transaction
    /// Returns true if the transaction was found and deleted, false otherwise
    async fn delete_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<bool>;
}

/// Trait defining the interface for work session storage operations
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Store a new session
    async fn store_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()>;

    /// Insert or overwrite a session (used by data import)
    async fn put_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()>;

    async fn get_session(&self, owner_id: &str, session_id: &str) -> StorageResult<Option<WorkSession>>;

    /// List sessions, most recently started first
    async fn list_sessions(&self, owner_id: &str) -> StorageResult<Vec<WorkSession>>;

    /// Overwrite an existing session. Fails with `NotFound` if it does not exist.
    async fn update_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()>;

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> StorageResult<bool>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type (in-memory, CSV, etc.)
/// and provides factory methods for creating repositories. This allows the domain
/// layer to work with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type GoalRepository: GoalStorage + Clone + 'static;
    type TransactionRepository: TransactionStorage + Clone + 'static;
    type SessionRepository: SessionStorage + Clone + 'static;

    fn create_goal_repository(&self) -> Self::GoalRepository;
    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_session_repository(&self) -> Self::SessionRepository;
}

/// Check `condition` against the stored goal, apply the patch and bump the revision.
///
/// Shared by every backend so conditional-write semantics cannot drift.
pub fn apply_goal_update(goal: &mut Goal, patch: &GoalPatch, condition: WriteCondition) -> StorageResult<()> {
    if let WriteCondition::Revision(expected) = condition {
        if goal.revision != expected {
            return Err(StorageError::RevisionConflict {
                id: goal.id.clone(),
                expected,
                actual: goal.revision,
            });
        }
    }
    patch.apply_to(goal);
    goal.revision += 1;
    Ok(())
}

/// Revision for a record overwritten by `put_goal`: always past the one it replaces.
pub fn overwrite_revision(existing: Option<&Goal>, incoming: &Goal) -> u64 {
    match existing {
        Some(current) => incoming.revision.max(current.revision + 1),
        None => incoming.revision,
    }
}
