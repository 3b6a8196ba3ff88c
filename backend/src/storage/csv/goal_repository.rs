//! # CSV Goal Repository
//!
//! File-based goal storage: each user's goals live in
//! `{data_dir}/{user_directory}/goals.csv`.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! └── {user_directory}/
//!     ├── goals.csv    ← This module manages these files
//!     ├── sessions.csv
//!     └── transactions.csv
//! ```
//!
//! ## CSV Format
//!
//! ```csv
//! id,name,category,period,target,current,last_reset,created_at,revision
//! goal::5b9e…,Renda diária,receita,daily,250.0,120.0,2024-05-15T03:00:00+00:00,2024-05-01T12:00:00+00:00,7
//! ```
//!
//! Every write rewrites the whole file through a temp file while holding the
//! connection's write lock, so each single-goal update is atomic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::connection::{parse_timestamp, read_records, write_records, CsvConnection};
use crate::domain::models::goal::{Goal, GoalPatch, GoalPeriod};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::{apply_goal_update, overwrite_revision, GoalStorage, WriteCondition};

const COLLECTION: &str = "goals";

/// CSV record structure for goals
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GoalRecord {
    id: String,
    name: String,
    category: String,
    period: String,
    target: f64,
    current: f64,
    last_reset: String,
    created_at: String,
    revision: u64,
}

impl From<&Goal> for GoalRecord {
    fn from(goal: &Goal) -> Self {
        GoalRecord {
            id: goal.id.clone(),
            name: goal.name.clone(),
            category: goal.category.clone(),
            period: goal.period.to_string(),
            target: goal.target,
            current: goal.current,
            last_reset: goal.last_reset.to_rfc3339(),
            created_at: goal.created_at.to_rfc3339(),
            revision: goal.revision,
        }
    }
}

impl GoalRecord {
    fn into_goal(self, path: &Path) -> StorageResult<Goal> {
        Ok(Goal {
            last_reset: parse_timestamp(path, &self.last_reset)?,
            created_at: parse_timestamp(path, &self.created_at)?,
            id: self.id,
            name: self.name,
            category: self.category,
            period: GoalPeriod::from(self.period),
            target: self.target,
            current: self.current,
            revision: self.revision,
        })
    }
}

/// CSV-based goal repository using per-user CSV files
#[derive(Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
}

impl GoalRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_goals(&self, owner_id: &str) -> StorageResult<Vec<Goal>> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        read_records::<GoalRecord>(&path)?
            .into_iter()
            .map(|record| record.into_goal(&path))
            .collect()
    }

    fn write_goals(&self, owner_id: &str, goals: &[Goal]) -> StorageResult<()> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        let records: Vec<GoalRecord> = goals.iter().map(GoalRecord::from).collect();
        write_records(&path, &records)
    }
}

#[async_trait]
impl GoalStorage for GoalRepository {
    async fn store_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()> {
        info!("Storing goal in CSV: {}", goal.id);
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals(owner_id)?;
        if goals.iter().any(|g| g.id == goal.id) {
            return Err(StorageError::AlreadyExists(goal.id.clone()));
        }
        goals.push(goal.clone());
        self.write_goals(owner_id, &goals)
    }

    async fn put_goal(&self, owner_id: &str, goal: &Goal) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals(owner_id)?;
        let mut record = goal.clone();
        match goals.iter_mut().find(|g| g.id == goal.id) {
            Some(existing) => {
                record.revision = overwrite_revision(Some(&*existing), goal);
                *existing = record;
            }
            None => goals.push(record),
        }
        self.write_goals(owner_id, &goals)
    }

    async fn list_goals(&self, owner_id: &str) -> StorageResult<Vec<Goal>> {
        self.read_goals(owner_id)
    }

    async fn get_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<Option<Goal>> {
        Ok(self.read_goals(owner_id)?.into_iter().find(|g| g.id == goal_id))
    }

    async fn update_goal(
        &self,
        owner_id: &str,
        goal_id: &str,
        patch: &GoalPatch,
        condition: WriteCondition,
    ) -> StorageResult<Goal> {
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals(owner_id)?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| StorageError::NotFound(goal_id.to_string()))?;
        apply_goal_update(goal, patch, condition)?;
        let updated = goal.clone();

        self.write_goals(owner_id, &goals)?;
        debug!("Updated goal {} to revision {}", updated.id, updated.revision);
        Ok(updated)
    }

    async fn delete_goal(&self, owner_id: &str, goal_id: &str) -> StorageResult<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals(owner_id)?;
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        if goals.len() == before {
            return Ok(false);
        }
        self.write_goals(owner_id, &goals)?;
        info!("Deleted goal: {}", goal_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::traits::Connection;
    use chrono::{TimeZone, Utc};

    fn sample_goal(category: &str) -> Goal {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Goal::new("Renda diária", category, GoalPeriod::Daily, 250.0, created)
    }

    #[tokio::test]
    async fn test_store_and_get_goal() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_goal_repository();
        let goal = sample_goal("receita");

        repo.store_goal("driver-1", &goal).await.expect("Failed to store goal");

        let retrieved = repo
            .get_goal("driver-1", &goal.id)
            .await
            .expect("Failed to get goal")
            .expect("Goal should exist");
        assert_eq!(retrieved, goal);
        assert!(env.base_path.join("driver-1").join("goals.csv").exists());
    }

    #[tokio::test]
    async fn test_unknown_period_round_trips_verbatim() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_goal_repository();
        let mut goal = sample_goal("km");
        goal.period = GoalPeriod::Other("Quarterly".to_string());

        repo.store_goal("driver-1", &goal).await.unwrap();
        let retrieved = repo.get_goal("driver-1", &goal.id).await.unwrap().unwrap();
        assert_eq!(retrieved.period, GoalPeriod::Other("Quarterly".to_string()));
    }

    #[tokio::test]
    async fn test_conditional_update_persists_revision() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_goal_repository();
        let goal = sample_goal("receita");
        repo.store_goal("driver-1", &goal).await.unwrap();

        let patch = GoalPatch { current: Some(42.5), ..Default::default() };
        let updated = repo
            .update_goal("driver-1", &goal.id, &patch, WriteCondition::Revision(0))
            .await
            .unwrap();
        assert_eq!(updated.revision, 1);

        // A fresh repository over the same files sees the new state
        let reopened = CsvConnection::new(&env.base_path).unwrap().create_goal_repository();
        let stored = reopened.get_goal("driver-1", &goal.id).await.unwrap().unwrap();
        assert_eq!(stored.current, 42.5);
        assert_eq!(stored.revision, 1);

        let err = reopened
            .update_goal("driver-1", &goal.id, &patch, WriteCondition::Revision(0))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_goal() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_goal_repository();
        let keep = sample_goal("receita");
        let drop = sample_goal("km");
        repo.store_goal("driver-1", &keep).await.unwrap();
        repo.store_goal("driver-1", &drop).await.unwrap();

        assert!(repo.delete_goal("driver-1", &drop.id).await.unwrap());
        assert!(!repo.delete_goal("driver-1", &drop.id).await.unwrap());

        let remaining = repo.list_goals("driver-1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_reported() {
        let env = TestEnvironment::new().await.unwrap();
        let path = env.connection.collection_path("driver-1", "goals");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "id,name,category,period,target,current,last_reset,created_at,revision\n\
             goal::x,Renda,receita,daily,10.0,0.0,not-a-date,2024-05-01T12:00:00+00:00,0\n",
        )
        .unwrap();

        let repo = env.connection.create_goal_repository();
        let err = repo.list_goals("driver-1").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
