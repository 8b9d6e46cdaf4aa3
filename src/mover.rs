//! Relocation of single files into destination folders.
//!
//! Each move is independent: a failure is returned to the caller for
//! reporting and never stops the run. Only moves that actually happened are
//! appended to the run log.

use crate::error::{OrganizeError, OrganizeResult};
use crate::output::OutputFormatter;
use crate::run_log::{LogEntry, RunLog};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What to do when the destination folder already holds a same-named entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the file where it is and report the conflict.
    #[default]
    Skip,
    /// Replace the existing destination file.
    Overwrite,
}

/// Result of a successful call to [`Mover::move_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives at this path.
    Moved(PathBuf),
    /// Preview mode: the move was only announced.
    Previewed(PathBuf),
}

/// Moves files and records the moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mover {
    on_conflict: ConflictPolicy,
}

impl Mover {
    pub fn new(on_conflict: ConflictPolicy) -> Self {
        Self { on_conflict }
    }

    /// Moves `file_path` into `destination_folder`, keeping its name.
    ///
    /// In preview mode the move is announced and nothing else happens: no
    /// filesystem change and no log entry. Otherwise the file is renamed into
    /// place (copy then delete when the rename crosses filesystems), a move
    /// entry is appended to `log` and a success line is printed.
    ///
    /// # Errors
    ///
    /// * `OrganizeError::DestinationExists` when the policy is
    ///   [`ConflictPolicy::Skip`] and the name is taken.
    /// * `OrganizeError::FileMoveFailure` when the move itself fails.
    ///
    /// In both cases the file stays where it was and `log` is untouched.
    pub fn move_file(
        &self,
        file_path: &Path,
        destination_folder: &Path,
        preview: bool,
        log: &mut RunLog,
    ) -> OrganizeResult<MoveOutcome> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: destination_folder.to_path_buf(),
                source_error: std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;
        let display_name = file_name.to_string_lossy().to_string();
        let destination_path = destination_folder.join(file_name);

        if preview {
            OutputFormatter::dry_run_notice(&format!(
                "Would move: {} → {}",
                display_name,
                destination_folder.display()
            ));
            return Ok(MoveOutcome::Previewed(destination_path));
        }

        // symlink_metadata so a dangling link at the destination still counts
        if let Ok(existing) = fs::symlink_metadata(&destination_path) {
            match self.on_conflict {
                ConflictPolicy::Skip => {
                    return Err(OrganizeError::DestinationExists {
                        source: file_path.to_path_buf(),
                        destination: destination_path,
                    });
                }
                ConflictPolicy::Overwrite if existing.is_dir() => {
                    return Err(OrganizeError::FileMoveFailure {
                        source: file_path.to_path_buf(),
                        destination: destination_path,
                        source_error: std::io::Error::new(
                            ErrorKind::AlreadyExists,
                            "a directory with this name is in the way",
                        ),
                    });
                }
                ConflictPolicy::Overwrite => {}
            }
        }

        relocate(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        log.append(LogEntry::Move {
            file: display_name.clone(),
            to: destination_folder.to_path_buf(),
        });
        OutputFormatter::success(&format!(
            "Moved: {} → {}",
            display_name,
            destination_folder.display()
        ));

        Ok(MoveOutcome::Moved(destination_path))
    }
}

/// Renames `from` to `to`, copying across filesystem boundaries.
fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
