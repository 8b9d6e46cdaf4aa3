//! Idempotent creation of category and month folders.
//!
//! Folder creation is never logged: the run log only records file moves and
//! folder deletions.

use crate::error::{OrganizeError, OrganizeResult};
use crate::output::OutputFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Materializes (or, in preview mode, simulates) directories.
pub struct FolderStore;

impl FolderStore {
    /// Ensures `parent/name` exists as a directory and returns its path.
    ///
    /// * An existing directory is returned untouched.
    /// * In preview mode nothing is created; a `[DRY-RUN]` notice is printed
    ///   and the would-be path is returned.
    /// * Otherwise the directory is created along with any missing parents.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::DirectoryCreationFailed` if creation fails or
    /// the path is occupied by something that is not a directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use coursetidy::folder_store::FolderStore;
    /// use std::path::Path;
    ///
    /// let month = FolderStore::ensure(Path::new("/notes/Math"), "2024-03", false);
    /// match month {
    ///     Ok(path) => println!("Ready: {}", path.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn ensure(parent: &Path, name: &str, preview: bool) -> OrganizeResult<PathBuf> {
        let full_path = parent.join(name);

        if full_path.is_dir() {
            return Ok(full_path);
        }

        if full_path.exists() {
            return Err(OrganizeError::DirectoryCreationFailed {
                path: full_path,
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "a file with this name is in the way",
                ),
            });
        }

        if preview {
            OutputFormatter::dry_run_notice(&format!(
                "Would create folder: {}",
                full_path.display()
            ));
            return Ok(full_path);
        }

        // create_dir_all tolerates a concurrent creator winning the race
        fs::create_dir_all(&full_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: full_path.clone(),
            source: e,
        })?;
        OutputFormatter::plain(&format!("Created folder: {}", full_path.display()));

        Ok(full_path)
    }
}
