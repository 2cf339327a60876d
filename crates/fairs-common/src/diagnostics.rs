//! Failure diagnostics sink
//!
//! Database and connection failures are reported to the caller with a short,
//! generic message. The raw detail (message and cause chain) goes here instead,
//! into an append-only file that operators can inspect after a failed run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, warn};

/// Default file name for the failure log
pub const DEFAULT_FAILURE_LOG_FILE: &str = "log.txt";

/// Receives raw failure detail.
///
/// Implementations must never fail or panic: a broken diagnostics sink must
/// not mask the error being reported.
pub trait FailureLog: Send + Sync {
    fn log_failure(&self, error: &anyhow::Error);
}

impl<T: FailureLog + ?Sized> FailureLog for std::sync::Arc<T> {
    fn log_failure(&self, error: &anyhow::Error) {
        (**self).log_failure(error);
    }
}

/// Appends one block per failure to a plain-text file.
#[derive(Debug)]
pub struct FileFailureLog {
    path: PathBuf,
    // Serializes appends coming from the same process
    write_lock: Mutex<()>,
}

impl FileFailureLog {
    /// Create a failure log writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve the path from `FAILURE_LOG_PATH`, falling back to `log.txt`
    pub fn from_env() -> Self {
        let path = std::env::var("FAILURE_LOG_PATH")
            .unwrap_or_else(|_| DEFAULT_FAILURE_LOG_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        file.flush()
    }
}

impl FailureLog for FileFailureLog {
    fn log_failure(&self, failure: &anyhow::Error) {
        error!(error = %failure, error_chain = ?failure.chain().collect::<Vec<_>>(), "Operation failed");

        let entry = format_entry(failure, chrono::Local::now());
        if let Err(e) = self.append(&entry) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to write failure log entry"
            );
        }
    }
}

/// Only emits a `tracing` error event; nothing is persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureLog;

impl FailureLog for TracingFailureLog {
    fn log_failure(&self, failure: &anyhow::Error) {
        error!(error = %failure, error_chain = ?failure.chain().collect::<Vec<_>>(), "Operation failed");
    }
}

fn format_entry(failure: &anyhow::Error, at: chrono::DateTime<chrono::Local>) -> String {
    let mut entry = String::new();
    entry.push_str("================== EXCEPTION ==================\n");
    entry.push_str(&format!("DATETIME: {}\n", at.format("%Y-%m-%d %H:%M:%S")));
    entry.push_str(&format!("MESSAGE: {}\n", failure));
    entry.push_str("CAUSES:\n");
    for (depth, cause) in failure.chain().skip(1).enumerate() {
        entry.push_str(&format!("#{} {}\n", depth, cause));
    }
    entry.push_str("\n\n\n");
    entry
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_entry_contains_message_and_causes() {
        let failure = Err::<(), _>(anyhow::anyhow!("duplicate key value"))
            .context("Failed to insert district")
            .unwrap_err();

        let entry = format_entry(&failure, chrono::Local::now());

        assert!(entry.starts_with("================== EXCEPTION"));
        assert!(entry.contains("MESSAGE: Failed to insert district"));
        assert!(entry.contains("#0 duplicate key value"));
    }

    #[test]
    fn test_file_failure_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.txt");
        let log = FileFailureLog::new(&path);

        log.log_failure(&anyhow::anyhow!("first"));
        log.log_failure(&anyhow::anyhow!("second"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("EXCEPTION").count(), 2);
        assert!(contents.find("MESSAGE: first").unwrap() < contents.find("MESSAGE: second").unwrap());
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let log = FileFailureLog::new(dir.path());

        log.log_failure(&anyhow::anyhow!("ignored"));
    }
}
