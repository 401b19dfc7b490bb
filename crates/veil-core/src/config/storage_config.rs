//! Mapping store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite mapping database.
    pub db_path: Option<String>,
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u32>,
    /// Number of read connections. Default: 4.
    pub read_pool_size: Option<usize>,
    /// Attempts for a contended write before failing. Default: 5.
    pub max_write_retries: Option<u32>,
    /// First backoff delay; doubles each retry. Default: 20ms.
    pub initial_backoff_ms: Option<u64>,
    /// Backoff ceiling. Default: 1000ms.
    pub max_backoff_ms: Option<u64>,
}

impl StorageConfig {
    pub fn effective_db_path(&self) -> String {
        self.db_path
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_DB_FILENAME.to_string())
    }

    pub fn effective_busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms
            .unwrap_or(defaults::DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size
            .unwrap_or(defaults::DEFAULT_READ_POOL_SIZE)
    }

    pub fn effective_max_write_retries(&self) -> u32 {
        self.max_write_retries
            .unwrap_or(defaults::DEFAULT_MAX_WRITE_RETRIES)
    }

    pub fn effective_initial_backoff(&self) -> Duration {
        Duration::from_millis(
            self.initial_backoff_ms
                .unwrap_or(defaults::DEFAULT_INITIAL_BACKOFF_MS),
        )
    }

    pub fn effective_max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.unwrap_or(defaults::DEFAULT_MAX_BACKOFF_MS))
    }
}
