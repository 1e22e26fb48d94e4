//! # Configuration
//!
//! Settings are resolved in priority order:
//! 1. **Environment variables**: `SCANLIST_DEBOUNCE_MS`, `SCANLIST_BUCKET_MS`, etc.
//! 2. **Config file**: `<data_dir>/scanlist.toml`.
//! 3. **Compiled defaults**: `#[config(default = ...)]` below.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `debounce_ms` | `SCANLIST_DEBOUNCE_MS` | `1500` | In-memory repeat suppression per list (at most one day) |
//! | `bucket_ms` | `SCANLIST_BUCKET_MS` | `1000` | Width of the durable dedup bucket (1 ms to one day) |
//! | `export_delimiter` | `SCANLIST_EXPORT_DELIMITER` | `,` | CSV field delimiter (one character) |
//! | `handoff_retry_attempts` | `SCANLIST_HANDOFF_RETRY_ATTEMPTS` | `3` | Drain attempts before giving up |
//! | `handoff_retry_delay_ms` | `SCANLIST_HANDOFF_RETRY_DELAY_MS` | `200` | Pause between drain attempts |
//! | `default_list` | `SCANLIST_DEFAULT_LIST` | `default-list` | List used when nothing else names one |
//!
//! The two dedup windows are independent. Raising one never moves the other.

use crate::error::{Result, ScanError};
use crate::export::CsvOptions;
use crate::handoff::RetryPolicy;
use crate::ingest::{IngestSettings, MAX_WINDOW_MS};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "scanlist.toml";
pub const DEFAULT_LIST: &str = "default-list";

pub const KEYS: [&str; 6] = [
    "debounce_ms",
    "bucket_ms",
    "export_delimiter",
    "handoff_retry_attempts",
    "handoff_retry_delay_ms",
    "default_list",
];

/// Configuration for scanlist, stored in `scanlist.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanlistConfig {
    /// Repeats of the same code into the same list within this many
    /// milliseconds are rejected before reaching storage.
    #[config(env = "SCANLIST_DEBOUNCE_MS", default = 1500)]
    pub debounce_ms: u64,

    /// Writes of the same code whose timestamps share a bucket of this many
    /// milliseconds collapse into one stored item.
    #[config(env = "SCANLIST_BUCKET_MS", default = 1000)]
    pub bucket_ms: u64,

    /// Field delimiter for CSV export.
    #[config(env = "SCANLIST_EXPORT_DELIMITER", default = ",")]
    pub export_delimiter: String,

    /// How many times a consumer checks the handoff channel for pending scans.
    #[config(env = "SCANLIST_HANDOFF_RETRY_ATTEMPTS", default = 3)]
    pub handoff_retry_attempts: u32,

    /// Pause between handoff checks, in milliseconds.
    #[config(env = "SCANLIST_HANDOFF_RETRY_DELAY_MS", default = 200)]
    pub handoff_retry_delay_ms: u64,

    /// List that receives scans when neither the batch nor the last session names one.
    #[config(env = "SCANLIST_DEFAULT_LIST", default = "default-list")]
    pub default_list: String,
}

impl Default for ScanlistConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::ingest::DEFAULT_DEBOUNCE_MS,
            bucket_ms: crate::ingest::DEFAULT_BUCKET_MS,
            export_delimiter: ",".to_string(),
            handoff_retry_attempts: 3,
            handoff_retry_delay_ms: 200,
            default_list: DEFAULT_LIST.to_string(),
        }
    }
}

impl ScanlistConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load from the environment and `<data_dir>/scanlist.toml`. A missing file is fine.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(Self::path(data_dir))
            .load()
            .map_err(|e| ScanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// A commented `scanlist.toml` with every key at its default.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }

    pub fn validate(&self) -> Result<()> {
        self.csv_options()?;
        for (key, value) in [("debounce_ms", self.debounce_ms), ("bucket_ms", self.bucket_ms)] {
            if value > MAX_WINDOW_MS {
                return Err(ScanError::Config(format!(
                    "{} must be at most {} (one day), got {}",
                    key, MAX_WINDOW_MS, value
                )));
            }
        }
        if self.bucket_ms == 0 {
            return Err(ScanError::Config("bucket_ms must be at least 1".into()));
        }
        if self.default_list.trim().is_empty() {
            return Err(ScanError::Config("default_list must not be empty".into()));
        }
        Ok(())
    }

    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings::from_millis(self.debounce_ms, self.bucket_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.handoff_retry_attempts,
            delay: Duration::from_millis(self.handoff_retry_delay_ms),
        }
    }

    pub fn csv_options(&self) -> Result<CsvOptions> {
        let mut chars = self.export_delimiter.chars();
        let delimiter = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ScanError::Config(format!(
                    "export_delimiter must be a single character, got {:?}",
                    self.export_delimiter
                )))
            }
        };
        CsvOptions::new(delimiter)
            .map_err(|e| ScanError::Config(format!("export_delimiter: {}", e)))
    }

    pub fn default_list(&self) -> &str {
        self.default_list.trim()
    }

    /// Value of one setting, formatted for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "debounce_ms" => self.debounce_ms.to_string(),
            "bucket_ms" => self.bucket_ms.to_string(),
            "export_delimiter" => self.export_delimiter.clone(),
            "handoff_retry_attempts" => self.handoff_retry_attempts.to_string(),
            "handoff_retry_delay_ms" => self.handoff_retry_delay_ms.to_string(),
            "default_list" => self.default_list.clone(),
            _ => return None,
        };
        Some(value)
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}
