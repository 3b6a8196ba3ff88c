//! # In-Memory Storage
//!
//! Process-local backend keeping every user's collections in one map behind a
//! mutex. Each trait call takes the lock once, which makes every single-record
//! operation atomic. Used by tests and by `storage: memory` deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::{StorageError, StorageResult};
use super::traits::{
    apply_goal_update, overwrite_revision, Connection, GoalStorage, SessionStorage,
    TransactionFilter, TransactionStorage, WriteCondition,
};
use crate::domain::models::goal::{Goal, GoalPatch};
use crate::domain::models::session::WorkSession;
use crate::domain::models::transaction::Transaction;

#[derive(Debug, Default)]
struct UserCollections {
    goals: Vec<Goal>,
    transactions: Vec<Transaction>,
    sessions: Vec<WorkSession>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<Mutex<HashMap<String, UserCollections>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, UserCollections>>> {
        self.users.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Run an inserting write, creating the user's collections on first use
    fn with_user<T>(&self, owner_id: &str, f: impl FnOnce(&mut UserCollections) -> StorageResult<T>) -> StorageResult<T> {
        let mut users = self.lock()?;
        let collections = users.entry(owner_id.to_string()).or_default();
        f(collections)
    }

    fn read_user<T>(&self, owner_id: &str, f: impl FnOnce(&UserCollections) -> StorageResult<T>) -> StorageResult<T> {
        let users = self.lock()?;
        match users.get(owner_id) {
            Some(collections) => f(collections),
            None => f(&UserCollections::default()),
        }
    }

    /// Update or delete in place. An unknown user behaves like one with no records.
    fn modify_user<T>(&self, owner_id: &str, f: impl FnOnce(&mut UserCollections) -> StorageResult<T>) -> StorageResult<T> {
        let mut users = self.lock()?;
        match users.get_mut(owner_id) {
            Some(collections) => f(collections),
            None => f(&mut UserCollections::default()),
        }
    }
}

impl Connection for MemoryStore {
    type GoalRepository = MemoryStore;
    type TransactionRepository = MemoryStore;
    type SessionRepository = MemoryStore;

    fn create_goal_repository(&self) -> Self::GoalRepository {
        self.clone()
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        self.clone()
    }

    fn create_session_repository(&self) -> Self::SessionRepository {
        self.clone()
    }
}

#[async_trait]
impl GoalStorage for MemoryStore {
    async fn store_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            if user.goals.iter().any(|g| g.id == goal.id) {
                return Err(StorageError::AlreadyExists(goal.id.clone()));
            }
            user.goals.push(goal.clone());
            Ok(())
        })
    }

    async fn put_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            let mut record = goal.clone();
            match user.goals.iter_mut().find(|g| g.id == goal.id) {
                Some(existing) => {
                    record.revision = overwrite_revision(Some(&*existing), goal);
                    *existing = record;
                }
                None => user.goals.push(record),
            }
            Ok(())
        })
    }

    async fn list_goals(&self, owner_id: &str) -> StorageResult<Vec<Goal>> {
        self.read_user(owner_id, |user| Ok(user.goals.clone()))
    }

    async fn get_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<Option<Goal>> {
        self.read_user(owner_id, |user| Ok(user.goals.iter().find(|g| g.id == goal_id).cloned()))
    }

    async fn update_goal(
        &self,
        owner_id: &str,
        goal_id: &str,
        patch: &GoalPatch,
        condition: WriteCondition,
    ) -> StorageResult<Goal> {
        self.modify_user(owner_id, |user| {
            let goal = user
                .goals
                .iter_mut()
                .find(|g| g.id == goal_id)
                .ok_or_else(|| StorageError::NotFound(goal_id.to_string()))?;
            apply_goal_update(goal, patch, condition)?;
            Ok(goal.clone())
        })
    }

    async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<bool> {
        self.modify_user(owner_id, |user| {
            let before = user.goals.len();
            user.goals.retain(|g| g.id != goal_id);
            Ok(user.goals.len() != before)
        })
    }
}

#[async_trait]
impl TransactionStorage for MemoryStore {
    async fn store_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            if user.transactions.iter().any(|t| t.id == transaction.id) {
                return Err(StorageError::AlreadyExists(transaction.id.clone()));
            }
            user.transactions.push(transaction.clone());
            Ok(())
        })
    }

    async fn put_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            match user.transactions.iter_mut().find(|t| t.id == transaction.id) {
                Some(existing) => *existing = transaction.clone(),
                None => user.transactions.push(transaction.clone()),
            }
            Ok(())
        })
    }

    async fn get_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<Option<Transaction>> {
        self.read_user(owner_id, |user| {
            Ok(user.transactions.iter().find(|t| t.id == transaction_id).cloned())
        })
    }

    async fn list_transactions(&self, owner_id: &str, filter: &TransactionFilter) -> StorageResult<Vec<Transaction>> {
        self.read_user(owner_id, |user| Ok(filter.apply(user.transactions.clone())))
    }

    async fn delete_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<bool> {
        self.modify_user(owner_id, |user| {
            let before = user.transactions.len();
            user.transactions.retain(|t| t.id != transaction_id);
            Ok(user.transactions.len() != before)
        })
    }
}

#[async_trait]
impl SessionStorage for MemoryStore {
    async fn store_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            if user.sessions.iter().any(|s| s.id == session.id) {
                return Err(StorageError::AlreadyExists(session.id.clone()));
            }
            user.sessions.push(session.clone());
            Ok(())
        })
    }

    async fn put_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        self.with_user(owner_id, |user| {
            match user.sessions.iter_mut().find(|s| s.id == session.id) {
                Some(existing) => *existing = session.clone(),
                None => user.sessions.push(session.clone()),
            }
            Ok(())
        })
    }

    async fn get_session(&self, owner_id: &str, session_id: &str) -> StorageResult<Option<WorkSession>> {
        self.read_user(owner_id, |user| Ok(user.sessions.iter().find(|s| s.id == session_id).cloned()))
    }

    async fn list_sessions(&self, owner_id: &str) -> StorageResult<Vec<WorkSession>> {
        self.read_user(owner_id, |user| {
            let mut sessions = user.sessions.clone();
            sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            Ok(sessions)
        })
    }

    async fn update_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        self.modify_user(owner_id, |user| {
            let existing = user
                .sessions
                .iter_mut()
                .find(|s| s.id == session.id)
                .ok_or_else(|| StorageError::NotFound(session.id.clone()))?;
            *existing = session.clone();
            Ok(())
        })
    }

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> StorageResult<bool> {
        self.modify_user(owner_id, |user| {
            let before = user.sessions.len();
            user.sessions.retain(|s| s.id != session_id);
            Ok(user.sessions.len() != before)
        })
    }
}
