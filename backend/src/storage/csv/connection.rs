use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::Connection;

use super::goal_repository::GoalRepository;
use super::session_repository::SessionRepository;
use super::transaction_repository::TransactionRepository;

/// CsvConnection manages file paths and serializes writes to the CSV files of every user
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    /// Held across each read-modify-write of a collection file
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> StorageResult<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Directory holding one user's collections
    pub fn user_directory(&self, owner_id: &str) -> PathBuf {
        self.base_directory.join(safe_directory_name(owner_id))
    }

    /// Path of `<collection>.csv` for a user
    pub fn collection_path(&self, owner_id: &str, collection: &str) -> PathBuf {
        self.user_directory(owner_id).join(format!("{}.csv", collection))
    }

    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

impl Connection for CsvConnection {
    type GoalRepository = GoalRepository;
    type TransactionRepository = TransactionRepository;
    type SessionRepository = SessionRepository;

    fn create_goal_repository(&self) -> Self::GoalRepository {
        GoalRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_session_repository(&self) -> Self::SessionRepository {
        SessionRepository::new(self.clone())
    }
}

/// Filesystem-safe directory name for a user ID.
///
/// Lowercase ASCII letters, digits, `-` and `_` are kept; every other byte
/// becomes `%XX` (uppercase hex). Distinct IDs always map to distinct names,
/// also on case-insensitive filesystems. The empty ID maps to `%`, which no
/// other ID can produce.
pub fn safe_directory_name(owner_id: &str) -> String {
    if owner_id.is_empty() {
        return "%".to_string();
    }
    let mut name = String::with_capacity(owner_id.len());
    for byte in owner_id.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
            _ => name.push_str(&format!("%{:02X}", byte)),
        }
    }
    name
}

/// Read every record of a collection file. A missing file is an empty collection.
pub(crate) fn read_records<R: DeserializeOwned>(path: &Path) -> StorageResult<Vec<R>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Replace a collection file with `records`, writing to a temp file first and renaming over it
pub(crate) fn write_records<R: Serialize>(path: &Path, records: &[R]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("csv.tmp");
    {
        let file = fs::File::create(&temp_path)?;
        let mut writer = Writer::from_writer(BufWriter::new(file));
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    debug!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

pub(crate) fn parse_timestamp(path: &Path, value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt {
            file: path.display().to_string(),
            reason: format!("invalid timestamp '{}': {}", value, e),
        })
}

pub(crate) fn parse_optional_timestamp(path: &Path, value: &str) -> StorageResult<Option<DateTime<Utc>>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_timestamp(path, value).map(Some)
}
