//! Server configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! `GIG_TRACKER_*` environment variables. A missing file is not an error;
//! a file that exists but does not parse is.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::goal_accrual::AccrualPolicy;
use crate::domain::time_window::{WeekStart, WindowCalculator, WindowZone};

pub const CONFIG_PATH_VAR: &str = "GIG_TRACKER_CONFIG";
pub const DATA_DIR_VAR: &str = "GIG_TRACKER_DATA_DIR";
pub const BIND_VAR: &str = "GIG_TRACKER_BIND";
pub const STORAGE_VAR: &str = "GIG_TRACKER_STORAGE";
pub const UTC_OFFSET_VAR: &str = "GIG_TRACKER_UTC_OFFSET_MINUTES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Csv,
    Memory,
}

impl StorageKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(StorageKind::Csv),
            "memory" => Ok(StorageKind::Memory),
            other => Err(anyhow!("Unknown storage backend '{}' (expected csv or memory)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualConfig {
    pub max_conflict_retries: u32,
    pub week_start: WeekStart,
    /// Fixed UTC offset for window boundaries; host local time when absent
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: AccrualPolicy::default().max_conflict_retries,
            week_start: WeekStart::Monday,
            utc_offset_minutes: None,
        }
    }
}

impl AccrualConfig {
    pub fn policy(&self) -> AccrualPolicy {
        AccrualPolicy { max_conflict_retries: self.max_conflict_retries }
    }

    pub fn window_calculator(&self) -> Result<WindowCalculator> {
        let zone = WindowZone::from_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            anyhow!("UTC offset of {:?} minutes is out of range", self.utc_offset_minutes)
        })?;
        Ok(WindowCalculator::new(zone, self.week_start))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_address: String,
    pub storage: StorageKind,
    pub log_level: String,
    /// Origin allowed by CORS
    pub allowed_origin: String,
    pub accrual: AccrualConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_address: "127.0.0.1:3000".to_string(),
            storage: StorageKind::Csv,
            log_level: "info".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            accrual: AccrualConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `GIG_TRACKER_CONFIG` (or `<data_dir>/config.yaml`)
    /// and apply environment overrides.
    pub fn load() -> Result<Self> {
        let lookup = |name: &str| std::env::var(name).ok();
        let path = lookup(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                lookup(DATA_DIR_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir)
                    .join("config.yaml")
            });

        let mut config = if path.exists() {
            Self::load_file(&path)?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `GIG_TRACKER_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup(DATA_DIR_VAR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup(BIND_VAR) {
            self.bind_address = bind;
        }
        if let Some(storage) = lookup(STORAGE_VAR) {
            self.storage = StorageKind::parse(&storage)?;
        }
        if let Some(offset) = lookup(UTC_OFFSET_VAR) {
            let minutes = offset
                .trim()
                .parse::<i32>()
                .with_context(|| format!("{} must be an integer, got '{}'", UTC_OFFSET_VAR, offset))?;
            self.accrual.utc_offset_minutes = Some(minutes);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gig-tracker")
}
