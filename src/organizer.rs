//! One organizing pass over a directory.
//!
//! A run moves through fixed phases:
//!
//! 1. check the root (the only step that can abort the run)
//! 2. enumerate the top-level files
//! 3. classify, plan, create folders and move, one file at a time
//! 4. hand the resulting tally to the merge phase
//! 5. persist the run log
//!
//! Per-file and per-category failures are reported and skipped; the run
//! always reaches the end once the root check has passed.

use crate::config::CompiledConfig;
use crate::error::{OrganizeError, OrganizeResult};
use crate::folder_store::FolderStore;
use crate::merger::CategoryMerger;
use crate::mover::{MoveOutcome, Mover};
use crate::output::OutputFormatter;
use crate::path_planner::{FileRecord, PathPlanner};
use crate::run_log::{LogPolicy, RunLog};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of files routed into each category during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    counts: BTreeMap<String, usize>,
}

impl CategoryTally {
    /// Counts one more file for `category`.
    pub fn record(&mut self, category: &str) {
        *self.counts.entry(category.to_string()).or_insert(0) += 1;
    }

    /// Files counted for `category`.
    pub fn get(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Categories and counts, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Categories with fewer than `threshold` files, excluding `exempt`.
    pub fn below(&self, threshold: usize, exempt: &str) -> Vec<&str> {
        self.iter()
            .filter(|&(name, count)| count < threshold && name != exempt)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Where one file was routed during the main pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub category: String,
    /// The file's location before the pass.
    pub source: PathBuf,
    /// The month folder it was (or, in preview, would be) moved into.
    pub folder: PathBuf,
}

/// Result of the per-file phase, consumed once by the merge phase.
#[derive(Debug, Default)]
struct PassOutcome {
    tally: CategoryTally,
    placements: Vec<Placement>,
    moved: usize,
    errors: usize,
}

/// Top-level files found by one listing of the root.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<FileRecord>,
    /// Directory entries that could not be read.
    unreadable: usize,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Top-level files selected for organizing.
    pub files_found: usize,
    /// Files moved by the main pass (zero in preview).
    pub moved: usize,
    /// Files moved (or, in preview, announced) into the overflow folder.
    pub merged_files: usize,
    /// Per-category counts from the main pass.
    pub tally: CategoryTally,
    /// Categories dissolved into the overflow folder.
    pub merged_categories: Vec<String>,
    /// Errors reported during the run.
    pub errors: usize,
    /// Whether the run log was written.
    pub log_saved: bool,
    /// Entries in the run log at the end of the run.
    pub log_entries: usize,
}

/// Organizes one directory according to a compiled configuration.
pub struct Organizer {
    root: PathBuf,
    config: CompiledConfig,
    preview: bool,
}

impl Organizer {
    /// Creates an organizer for `root`. Nothing is touched until [`run`](Self::run).
    pub fn new(root: impl Into<PathBuf>, config: CompiledConfig, preview: bool) -> Self {
        Self {
            root: root.into(),
            config,
            preview,
        }
    }

    /// Runs a full pass.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidBasePath` or
    /// `OrganizeError::NotADirectory` when the root is unusable. In that case
    /// nothing has been read or written. Every later failure is reported on
    /// the console and counted in [`RunReport::errors`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use coursetidy::config::CompiledConfig;
    /// use coursetidy::organizer::Organizer;
    ///
    /// let organizer = Organizer::new("/home/me/coursework", CompiledConfig::default(), true);
    /// match organizer.run() {
    ///     Ok(report) => println!("{} files would move", report.tally.total()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn run(&self) -> OrganizeResult<RunReport> {
        Self::check_root(&self.root)?;

        let settings = &self.config.settings;
        if self.preview {
            OutputFormatter::header(&format!(
                "DRY RUN: Analyzing contents of {}",
                self.root.display()
            ));
        } else {
            OutputFormatter::header(&format!("Organizing contents of {}", self.root.display()));
        }

        let mut log = match settings.log_policy {
            LogPolicy::Append => RunLog::load(&self.root, &settings.log_file),
            LogPolicy::Replace => RunLog::new(),
        };
        let mut report = RunReport::default();

        let files = match self.enumerate() {
            Ok(listing) => {
                report.errors += listing.unreadable;
                listing.files
            }
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                report.errors += 1;
                Vec::new()
            }
        };
        report.files_found = files.len();
        if files.is_empty() {
            OutputFormatter::info("No files to organize.");
        }

        let pass = self.organize_files(&files, &mut log);
        report.moved = pass.moved;
        report.errors += pass.errors;

        let mover = Mover::new(settings.on_conflict);
        let merger = CategoryMerger::new(
            settings.min_files_to_keep,
            &settings.overflow_category,
            mover,
        );
        let merge = merger.merge(
            &self.root,
            &pass.tally,
            &pass.placements,
            self.preview,
            &mut log,
        );
        report.merged_files = merge.moved;
        report.merged_categories = merge.merged;
        report.errors += merge.errors;
        report.tally = pass.tally;

        report.log_entries = log.len();
        report.log_saved = self.persist(&log);
        if !self.preview && !report.log_saved {
            report.errors += 1;
        }

        OutputFormatter::summary_table(
            &report.tally,
            &report.merged_categories,
            &settings.overflow_category,
        );
        if self.preview {
            OutputFormatter::success("Dry run complete. No files were modified.");
        } else if report.errors > 0 {
            OutputFormatter::warning(&format!(
                "Finished with {} error(s). Please review the messages above.",
                report.errors
            ));
        } else {
            OutputFormatter::success("Organization complete!");
        }

        Ok(report)
    }

    /// Fails unless `root` is an existing, readable directory.
    pub fn check_root(root: &Path) -> OrganizeResult<()> {
        let metadata = fs::metadata(root).map_err(|e| OrganizeError::InvalidBasePath {
            path: root.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_dir() {
            return Err(OrganizeError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Lists the regular files directly under the root, sorted by name.
    ///
    /// Subdirectories, symlinks, the run log and filtered files are left out.
    /// Entries that cannot be read are reported and counted, and the listing
    /// goes on without them.
    fn enumerate(&self) -> OrganizeResult<Listing> {
        let entries = fs::read_dir(&self.root).map_err(|e| OrganizeError::EnumerationFailed {
            path: self.root.clone(),
            source: e,
        })?;
        let log_file = OsStr::new(&self.config.settings.log_file);

        let mut listing = Listing::default();
        for entry in entries {
            let entry_and_type = entry.and_then(|entry| {
                let file_type = entry.file_type()?;
                Ok((entry, file_type))
            });
            let (entry, file_type) = match entry_and_type {
                Ok(pair) => pair,
                Err(e) => {
                    OutputFormatter::error(
                        &OrganizeError::EnumerationFailed {
                            path: self.root.clone(),
                            source: e,
                        }
                        .to_string(),
                    );
                    listing.unreadable += 1;
                    continue;
                }
            };

            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name();
            if name.as_os_str() == log_file {
                continue;
            }
            if self.config.filters.should_include(Path::new(&name)) {
                listing.files.push(FileRecord::read(&entry.path()));
            }
        }

        listing.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Classifies, plans and moves every file, building the tally.
    fn organize_files(&self, files: &[FileRecord], log: &mut RunLog) -> PassOutcome {
        let mut pass = PassOutcome::default();
        if files.is_empty() {
            return pass;
        }

        let mover = Mover::new(self.config.settings.on_conflict);
        let pb = OutputFormatter::create_progress_bar(files.len() as u64);
        for record in files {
            pb.suspend(|| self.organize_file(record, &mover, log, &mut pass));
            pb.inc(1);
        }
        pb.finish_and_clear();

        pass
    }

    /// Routes one file into `<root>/<category>/<month>`.
    ///
    /// A folder or move failure is reported and leaves the file in place; it
    /// is then not counted in the tally.
    fn organize_file(
        &self,
        record: &FileRecord,
        mover: &Mover,
        log: &mut RunLog,
        pass: &mut PassOutcome,
    ) {
        let category = self.config.classifier.classify(&record.name);
        let destination = PathPlanner::plan(record, category);

        let month_folder = FolderStore::ensure(&self.root, &destination.category, self.preview)
            .and_then(|category_folder| {
                FolderStore::ensure(&category_folder, &destination.month, self.preview)
            });
        let month_folder = match month_folder {
            Ok(path) => path,
            Err(e) => {
                OutputFormatter::error(&format!("Skipping {}: {}", record.name, e));
                pass.errors += 1;
                return;
            }
        };

        match mover.move_file(&record.path, &month_folder, self.preview, log) {
            Ok(outcome) => {
                if let MoveOutcome::Moved(_) = outcome {
                    pass.moved += 1;
                }
                pass.tally.record(&destination.category);
                pass.placements.push(Placement {
                    category: destination.category,
                    source: record.path.clone(),
                    folder: month_folder,
                });
            }
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                pass.errors += 1;
            }
        }
    }

    /// Writes the run log; never in preview mode. Returns whether it was written.
    fn persist(&self, log: &RunLog) -> bool {
        let log_file = &self.config.settings.log_file;
        if self.preview {
            OutputFormatter::dry_run_notice(&format!(
                "Would save {} log entries to {}",
                log.len(),
                RunLog::file_path(&self.root, log_file).display()
            ));
            return false;
        }

        match log.save(&self.root, log_file) {
            Ok(()) => {
                OutputFormatter::plain(&format!(
                    "Log saved to {}",
                    RunLog::file_path(&self.root, log_file).display()
                ));
                true
            }
            Err(e) => {
                OutputFormatter::error(&format!("Unable to save log: {}", e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tally_counts_and_threshold() {
        let mut tally = CategoryTally::default();
        for category in ["Math", "Math", "Math", "Art", "Other", "Misc"] {
            tally.record(category);
        }

        assert_eq!(tally.get("Math"), 3);
        assert_eq!(tally.get("Science"), 0);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.below(3, "Misc"), vec!["Art", "Other"]);
        assert_eq!(tally.below(4, "Misc"), vec!["Art", "Math", "Other"]);
    }

    #[test]
    fn test_check_root_rejects_missing_path() {
        let result = Organizer::check_root(Path::new("/non/existent/path"));
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }

    #[test]
    fn test_check_root_rejects_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("notes.txt");
        fs::write(&file_path, "x").expect("Failed to write file");

        let result = Organizer::check_root(&file_path);
        assert!(matches!(result, Err(OrganizeError::NotADirectory { .. })));
    }

    #[test]
    fn test_enumerate_skips_directories_log_and_hidden_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("b_history.txt"), "x").unwrap();
        fs::write(root.join("a_math.txt"), "x").unwrap();
        fs::write(root.join(".hidden"), "x").unwrap();
        fs::write(root.join("organizer_log.json"), "[]").unwrap();
        fs::create_dir(root.join("algebra_folder")).unwrap();

        let organizer = Organizer::new(root, CompiledConfig::default(), true);
        let listing = organizer.enumerate().expect("enumerate failed");
        let names: Vec<String> = listing.files.into_iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["a_math.txt", "b_history.txt"]);
        assert_eq!(listing.unreadable, 0);
    }
}
