//! # CSV Session Repository
//!
//! Stores each user's work sessions in `{user_directory}/sessions.csv`.
//! `ended_at` is left empty while a session is still running.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::connection::{parse_optional_timestamp, parse_timestamp, read_records, write_records, CsvConnection};
use crate::domain::models::session::{SessionStatus, WorkSession};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::SessionStorage;

const COLLECTION: &str = "sessions";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    id: String,
    started_at: String,
    ended_at: String,
    earnings: f64,
    distance_km: f64,
    rides: u32,
    notes: String,
    status: String,
}

impl From<&WorkSession> for SessionRecord {
    fn from(session: &WorkSession) -> Self {
        SessionRecord {
            id: session.id.clone(),
            started_at: session.started_at.to_rfc3339(),
            ended_at: session.ended_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            earnings: session.earnings,
            distance_km: session.distance_km,
            rides: session.rides,
            notes: session.notes.clone(),
            status: session.status.to_string(),
        }
    }
}

impl SessionRecord {
    fn into_session(self, path: &Path) -> StorageResult<WorkSession> {
        let status = SessionStatus::from_string(&self.status).map_err(|reason| StorageError::Corrupt {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(WorkSession {
            started_at: parse_timestamp(path, &self.started_at)?,
            ended_at: parse_optional_timestamp(path, &self.ended_at)?,
            id: self.id,
            earnings: self.earnings,
            distance_km: self.distance_km,
            rides: self.rides,
            notes: self.notes,
            status,
        })
    }
}

#[derive(Clone)]
pub struct SessionRepository {
    connection: CsvConnection,
}

impl SessionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_sessions(&self, owner_id: &str) -> StorageResult<Vec<WorkSession>> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        read_records::<SessionRecord>(&path)?
            .into_iter()
            .map(|record| record.into_session(&path))
            .collect()
    }

    fn write_sessions(&self, owner_id: &str, sessions: &[WorkSession]) -> StorageResult<()> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        let records: Vec<SessionRecord> = sessions.iter().map(SessionRecord::from).collect();
        write_records(&path, &records)
    }
}

#[async_trait]
impl SessionStorage for SessionRepository {
    async fn store_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut sessions = self.read_sessions(owner_id)?;
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(StorageError::AlreadyExists(session.id.clone()));
        }
        sessions.push(session.clone());
        self.write_sessions(owner_id, &sessions)?;
        info!("Stored session: {}", session.id);
        Ok(())
    }

    async fn put_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut sessions = self.read_sessions(owner_id)?;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.write_sessions(owner_id, &sessions)
    }

    async fn get_session(&self, owner_id: &str, session_id: &str) -> StorageResult<Option<WorkSession>> {
        Ok(self.read_sessions(owner_id)?.into_iter().find(|s| s.id == session_id))
    }

    async fn list_sessions(&self, owner_id: &str) -> StorageResult<Vec<WorkSession>> {
        let mut sessions = self.read_sessions(owner_id)?;
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn update_session(&self, owner_id: &str, session: &WorkSession) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut sessions = self.read_sessions(owner_id)?;
        let existing = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(|| StorageError::NotFound(session.id.clone()))?;
        *existing = session.clone();
        self.write_sessions(owner_id, &sessions)
    }

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> StorageResult<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut sessions = self.read_sessions(owner_id)?;
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.write_sessions(owner_id, &sessions)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::traits::Connection;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_active_session_round_trips_without_end() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_session_repository();
        let started = Utc.with_ymd_and_hms(2024, 5, 15, 7, 30, 0).unwrap();
        let session = WorkSession::start(started, "turno da manhã");

        repo.store_session("driver-1", &session).await.unwrap();
        let stored = repo.get_session("driver-1", &session.id).await.unwrap().unwrap();
        assert_eq!(stored, session);
        assert!(stored.ended_at.is_none());
    }

    #[tokio::test]
    async fn test_update_and_list_sessions() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_session_repository();
        let started = Utc.with_ymd_and_hms(2024, 5, 15, 7, 30, 0).unwrap();
        let first = WorkSession::start(started, "");
        let mut second = WorkSession::start(started + Duration::hours(10), "");
        repo.store_session("driver-1", &first).await.unwrap();
        repo.store_session("driver-1", &second).await.unwrap();

        second.ended_at = Some(started + Duration::hours(12));
        second.earnings = 210.0;
        second.status = SessionStatus::Completed;
        repo.update_session("driver-1", &second).await.unwrap();

        let listed = repo.list_sessions("driver-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], second);
        assert_eq!(listed[1].id, first.id);
    }
}
