//! Errors raised while organizing a directory.
//!
//! Only [`OrganizeError::InvalidBasePath`] and [`OrganizeError::NotADirectory`]
//! stop a run. Every other variant is reported for a single file, category or
//! the log, and the run carries on.

use std::path::PathBuf;

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target root does not exist or its metadata cannot be read.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The target root exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// Listing the target root failed.
    EnumerationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a category or month directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file into its destination folder.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// A file with the same name already sits in the destination folder.
    DestinationExists { source: PathBuf, destination: PathBuf },
    /// Walking a category folder during a merge failed.
    WalkFailed { path: PathBuf, reason: String },
    /// Removing a dissolved category folder failed.
    FolderRemovalFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the run log.
    HistoryWriteFailed { source: std::io::Error },
    /// Failed to read the run log.
    HistoryReadFailed { source: std::io::Error },
    /// The run log exists but is not a valid sequence of entries.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::NotADirectory { path } => {
                write!(f, "{} is not a directory", path.display())
            }
            Self::EnumerationFailed { path, source } => {
                write!(f, "Failed to list {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DestinationExists {
                source,
                destination,
            } => {
                write!(
                    f,
                    "Refusing to move {}: {} already exists",
                    source.display(),
                    destination.display()
                )
            }
            Self::WalkFailed { path, reason } => {
                write!(f, "Failed to walk {}: {}", path.display(), reason)
            }
            Self::FolderRemovalFailed { path, source } => {
                write!(f, "Failed to remove folder {}: {}", path.display(), source)
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write log file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read log file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid log file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBasePath { source, .. }
            | Self::EnumerationFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::FolderRemovalFailed { source, .. }
            | Self::HistoryWriteFailed { source }
            | Self::HistoryReadFailed { source } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            _ => None,
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
