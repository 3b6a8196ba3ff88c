use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Revision conflict on {id}: expected {expected}, found {actual}")]
    RevisionConflict { id: String, expected: u64, actual: u64 },
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Corrupt record in {file}: {reason}")]
    Corrupt { file: String, reason: String },
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::RevisionConflict { .. })
    }
}
