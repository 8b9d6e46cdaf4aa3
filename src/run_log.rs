//! The persisted record of what the organizer did.
//!
//! The log is a JSON array stored at the root of the organized directory:
//!
//! ```json
//! [
//!     { "action": "move", "file": "algebra_notes.txt", "to": "/notes/Math/2024-03" },
//!     { "action": "delete_folder", "folder": "/notes/Math" }
//! ]
//! ```
//!
//! It is loaded once when a run starts, appended to in memory and written back
//! once at the end. A run that dies half-way leaves the file as it was.

use crate::error::{OrganizeError, OrganizeResult};
use crate::output::OutputFormatter;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the log file inside the organized root.
pub const DEFAULT_LOG_FILE: &str = "organizer_log.json";

/// One action the organizer performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LogEntry {
    /// A file was moved into a folder.
    Move {
        /// File name of the moved file.
        file: String,
        /// Folder the file now lives in.
        to: PathBuf,
    },
    /// A dissolved category folder was removed.
    DeleteFolder { folder: PathBuf },
}

/// Whether a run keeps the entries left by earlier runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogPolicy {
    /// Load earlier entries and append this run's after them.
    #[default]
    Append,
    /// Start every run with an empty log.
    Replace,
}

/// Ordered, append-only sequence of [`LogEntry`] values for one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path of the log file for `root`.
    pub fn file_path(root: &Path, file_name: &str) -> PathBuf {
        root.join(file_name)
    }

    /// Loads the persisted log, falling back to an empty one.
    ///
    /// A missing file is silent. An unreadable or malformed file is reported
    /// as a warning and treated as empty; loading never fails a run.
    pub fn load(root: &Path, file_name: &str) -> Self {
        match Self::try_load(root, file_name) {
            Ok(Some(log)) => log,
            Ok(None) => Self::new(),
            Err(e) => {
                OutputFormatter::warning(&format!("Ignoring previous log: {}", e));
                Self::new()
            }
        }
    }

    /// Loads the persisted log, reporting why it could not be read.
    ///
    /// Returns `Ok(None)` when there is no log file.
    pub fn try_load(root: &Path, file_name: &str) -> OrganizeResult<Option<Self>> {
        let log_path = Self::file_path(root, file_name);

        if !log_path.exists() {
            return Ok(None);
        }

        let json_string = fs::read_to_string(&log_path)
            .map_err(|e| OrganizeError::HistoryReadFailed { source: e })?;

        let entries: Vec<LogEntry> =
            serde_json::from_str(&json_string).map_err(|e| OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            })?;

        Ok(Some(Self { entries }))
    }

    /// Appends an entry in memory.
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Writes every entry to the log file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::HistoryWriteFailed` if serialization or the
    /// write fails. Moves already performed are not affected.
    pub fn save(&self, root: &Path, file_name: &str) -> OrganizeResult<()> {
        let json_string = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        fs::write(Self::file_path(root, file_name), json_string)
            .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
