//! Folding of under-populated categories into the overflow folder.
//!
//! After the main pass, each category (other than the overflow one) whose
//! tally is below the threshold is dissolved: every file anywhere under its
//! folder is moved straight into `<root>/<overflow>`, then the emptied folder
//! tree is removed. Symlinks and other non-directory entries are moved like
//! files; only directories are left for the removal.
//!
//! Categories are processed in name order. The order only matters when two
//! merged categories hold files with the same name: under
//! [`ConflictPolicy::Skip`](crate::mover::ConflictPolicy::Skip) the category
//! that comes first takes the name in the overflow folder and the later one
//! keeps its folder.

use crate::error::{OrganizeError, OrganizeResult};
use crate::folder_store::FolderStore;
use crate::mover::Mover;
use crate::organizer::{CategoryTally, Placement};
use crate::output::OutputFormatter;
use crate::run_log::{LogEntry, RunLog};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What the merge phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Categories dissolved (or, in preview, that would be).
    pub merged: Vec<String>,
    /// Files moved into the overflow folder.
    pub moved: usize,
    /// Errors reported during the phase.
    pub errors: usize,
}

/// Outcome of dissolving one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMerge {
    /// Files relocated (or announced, in preview).
    pub moved: usize,
    /// Per-file move errors; the folder is kept when this is non-zero.
    pub errors: usize,
    /// Whether the category folder was removed (or would be).
    pub removed: bool,
}

/// Dissolves small categories into the overflow category.
pub struct CategoryMerger<'a> {
    min_files_to_keep: usize,
    overflow: &'a str,
    mover: Mover,
}

impl<'a> CategoryMerger<'a> {
    pub fn new(min_files_to_keep: usize, overflow: &'a str, mover: Mover) -> Self {
        Self {
            min_files_to_keep,
            overflow,
            mover,
        }
    }

    /// Runs the merge phase over the tally of the pass.
    ///
    /// The overflow folder is ensured once, only when at least one category
    /// is below the threshold, right before the first category is merged.
    /// `placements` are used in preview mode to announce moves of files that
    /// were only planned into a category folder.
    pub fn merge(
        &self,
        root: &Path,
        tally: &CategoryTally,
        placements: &[Placement],
        preview: bool,
        log: &mut RunLog,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        let shrinking = tally.below(self.min_files_to_keep, self.overflow);
        if shrinking.is_empty() {
            return report;
        }

        let overflow_folder = match FolderStore::ensure(root, self.overflow, preview) {
            Ok(path) => path,
            Err(e) => {
                OutputFormatter::error(&format!(
                    "Cannot merge small categories into {}: {}",
                    self.overflow, e
                ));
                report.errors += 1;
                return report;
            }
        };

        for category in shrinking {
            let planned: Vec<PathBuf> = placements
                .iter()
                .filter(|p| p.category == category)
                .map(|p| p.source.clone())
                .collect();

            match self.merge_category(root, category, &overflow_folder, &planned, preview, log) {
                Ok(outcome) => {
                    report.moved += outcome.moved;
                    report.errors += outcome.errors;
                    if outcome.removed {
                        report.merged.push(category.to_string());
                    }
                }
                Err(e) => {
                    OutputFormatter::error(&format!("Could not merge {}: {}", category, e));
                    report.errors += 1;
                }
            }
        }

        report
    }

    /// Dissolves a single category into `overflow_folder`.
    ///
    /// Files are collected from a full walk of the category folder before any
    /// of them is moved. A file that fails to move is reported and the
    /// remaining files are still moved; the folder is then left in place so
    /// nothing is deleted along with it.
    ///
    /// # Errors
    ///
    /// * `OrganizeError::WalkFailed` when the folder cannot be walked. No file
    ///   has been moved at that point.
    /// * `OrganizeError::FolderRemovalFailed` when every file moved but the
    ///   emptied folder could not be removed.
    pub fn merge_category(
        &self,
        root: &Path,
        category: &str,
        overflow_folder: &Path,
        planned: &[PathBuf],
        preview: bool,
        log: &mut RunLog,
    ) -> OrganizeResult<CategoryMerge> {
        let category_folder = root.join(category);
        let folder_exists = category_folder.is_dir();

        if !folder_exists && (!preview || planned.is_empty()) {
            return Ok(CategoryMerge::default());
        }

        let existing = if folder_exists {
            collect_files(&category_folder)?
        } else {
            Vec::new()
        };

        let announce = format!("small category '{}' → {}", category, self.overflow);
        if preview {
            OutputFormatter::dry_run_notice(&format!("Would merge {}", announce));
        } else {
            OutputFormatter::info(&format!("Merging {}", announce));
        }

        let mut outcome = CategoryMerge::default();
        let sources = if preview { planned } else { &[][..] };
        for file_path in sources.iter().chain(existing.iter()) {
            match self
                .mover
                .move_file(file_path, overflow_folder, preview, log)
            {
                Ok(_) => outcome.moved += 1,
                Err(e) => {
                    OutputFormatter::error(&e.to_string());
                    outcome.errors += 1;
                }
            }
        }

        if outcome.errors > 0 {
            OutputFormatter::warning(&format!(
                "Keeping {}: {} file(s) could not be moved",
                category_folder.display(),
                outcome.errors
            ));
            return Ok(outcome);
        }

        if preview {
            OutputFormatter::dry_run_notice(&format!(
                "Would delete folder: {}",
                category_folder.display()
            ));
        } else {
            fs::remove_dir_all(&category_folder).map_err(|e| {
                OrganizeError::FolderRemovalFailed {
                    path: category_folder.clone(),
                    source: e,
                }
            })?;
            log.append(LogEntry::DeleteFolder {
                folder: category_folder.clone(),
            });
            OutputFormatter::success(&format!("Removed folder: {}", category_folder.display()));
        }
        outcome.removed = true;

        Ok(outcome)
    }
}

/// Every non-directory entry below `folder`, at any depth, in path order.
///
/// Links are not followed, so a symlink is collected (and later moved) as the
/// link itself.
fn collect_files(folder: &Path) -> OrganizeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|e| OrganizeError::WalkFailed {
            path: folder.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
