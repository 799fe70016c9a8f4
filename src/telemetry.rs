//! Local error telemetry for prefabsrc
//!
//! Collects command errors in JSONL format so recurring registry problems
//! (missing asset folders, corrupt registry files) can be reviewed later.
//! Nothing leaves the machine.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// An error entry for the telemetry log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
    /// The command that was running (e.g., "populate", "get", "remove")
    pub command: String,
    /// The file being processed (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Type of error (e.g., "catalog_error", "store_error", "config_error")
    pub error_type: String,
    /// Error context/message
    pub context: String,
    /// Suggested fix (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorEntry {
    /// Create a new error entry with the current timestamp
    pub fn new(
        command: impl Into<String>,
        error_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp_now(),
            command: command.into(),
            file: None,
            error_type: error_type.into(),
            context: context.into(),
            suggestion: None,
        }
    }

    /// Set the file that was being processed
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Current UTC time in ISO 8601 format
pub fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Error collector that writes to a JSONL file
pub struct ErrorCollector {
    path: PathBuf,
    enabled: bool,
}

impl ErrorCollector {
    /// Create a new error collector
    pub fn new(path: impl AsRef<Path>, enabled: bool) -> Self {
        Self { path: path.as_ref().to_path_buf(), enabled }
    }

    /// Log an error entry (appends to JSONL file)
    pub fn log(&self, entry: &ErrorEntry) -> std::io::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entry).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(())
    }
}

// Global error collector (thread-local to avoid synchronization)
thread_local! {
    static COLLECTOR: std::cell::RefCell<Option<ErrorCollector>> = const { std::cell::RefCell::new(None) };
}

/// Initialize the global error collector
pub fn init_collector(path: impl AsRef<Path>, enabled: bool) {
    COLLECTOR.with(|c| {
        *c.borrow_mut() = Some(ErrorCollector::new(path, enabled));
    });
}

/// Log an error using the global collector
pub fn log_error(entry: &ErrorEntry) {
    COLLECTOR.with(|c| {
        if let Some(ref collector) = *c.borrow() {
            if let Err(e) = collector.log(entry) {
                tracing::warn!("failed to write error log: {}", e);
            }
        }
    });
}
