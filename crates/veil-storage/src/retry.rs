//! Bounded retry with exponential backoff for contended writes.

use std::time::Duration;

use veil_core::config::StorageConfig;
use veil_core::errors::{StorageError, VeilError, VeilResult};

/// Retry configuration for writes that lose the lock race.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Initial backoff duration (doubles each retry).
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_attempts: config.effective_max_write_retries().max(1),
            initial_backoff: config.effective_initial_backoff(),
            max_backoff: config.effective_max_backoff(),
        }
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts run out. Exhaustion is `StorageError::WriteConflict`, which
    /// is fatal: a contended write must never be mistaken for a fresh entity.
    pub fn run<T, F>(&self, op_name: &str, mut op: F) -> VeilResult<T>
    where
        F: FnMut(u32) -> VeilResult<T>,
    {
        let mut backoff = self.initial_backoff;
        let mut last_err = String::new();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tracing::debug!(
                    op = op_name,
                    attempt,
                    max_attempts = self.max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying contended write"
                );
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.max_backoff);
            }
            match op(attempt) {
                Err(e) if e.is_transient() => last_err = e.to_string(),
                other => return other,
            }
        }

        Err(VeilError::Storage(StorageError::WriteConflict {
            attempts: self.max_attempts,
            message: format!("{op_name}: {last_err}"),
        }))
    }

    /// Like [`run`](Self::run) for an operation with a step that must not be
    /// repeated. `op` sets the flag once it reaches that step; a transient
    /// failure after it is a `WriteConflict` instead of another attempt.
    pub fn run_unrepeatable<T, F>(&self, op_name: &str, mut op: F) -> VeilResult<T>
    where
        F: FnMut(u32, &mut bool) -> VeilResult<T>,
    {
        self.run(op_name, |attempt| {
            let mut passed = false;
            match op(attempt, &mut passed) {
                Err(e) if passed && e.is_transient() => {
                    Err(VeilError::Storage(StorageError::WriteConflict {
                        attempts: attempt,
                        message: format!("{op_name}: {e}"),
                    }))
                }
                other => other,
            }
        })
    }
}
