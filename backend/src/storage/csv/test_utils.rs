//! Test utilities for CSV-backed tests.
//!
//! Provides RAII-based cleanup that guarantees test data is removed
//! even if tests panic or fail.

use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::storage::error::StorageResult;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// Kept alive so the directory is only removed when the environment drops
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> StorageResult<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("GIG_TRACKER_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
