//! Destination planning: which `<category>/<YYYY-MM>` folder a file goes to.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Month bucket used when a file's modification time cannot be read.
pub const UNKNOWN_MONTH: &str = "UnknownMonth";

/// A file found at the top level of the root, with its timestamp read once.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Full path to the file.
    pub path: PathBuf,
    /// The file name component.
    pub name: String,
    /// Modification time, or `None` if it could not be read.
    pub modified: Option<DateTime<Local>>,
}

impl FileRecord {
    /// Builds a record for `path`, reading its modification time.
    ///
    /// Metadata errors are not surfaced; they only leave `modified` empty.
    pub fn read(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Local>::from);

        Self {
            path: path.to_path_buf(),
            name,
            modified,
        }
    }
}

/// Category and month bucket for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub category: String,
    pub month: String,
}

impl Destination {
    /// Resolves to `<root>/<category>/<month>`.
    pub fn folder(&self, root: &Path) -> PathBuf {
        root.join(&self.category).join(&self.month)
    }
}

/// Derives destinations from classification results and timestamps.
pub struct PathPlanner;

impl PathPlanner {
    /// Plans the destination of `record` within `category`.
    pub fn plan(record: &FileRecord, category: &str) -> Destination {
        Destination {
            category: category.to_string(),
            month: Self::month_bucket(record.modified.as_ref()),
        }
    }

    /// Formats a timestamp as `YYYY-MM`, or [`UNKNOWN_MONTH`].
    pub fn month_bucket(modified: Option<&DateTime<Local>>) -> String {
        match modified {
            Some(time) => time.format("%Y-%m").to_string(),
            None => UNKNOWN_MONTH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::TempDir;

    #[test]
    fn test_month_bucket_is_zero_padded() {
        let time = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(PathPlanner::month_bucket(Some(&time)), "2024-03");

        let time = Local.with_ymd_and_hms(987, 11, 2, 12, 0, 0).unwrap();
        assert_eq!(PathPlanner::month_bucket(Some(&time)), "0987-11");
    }

    #[test]
    fn test_missing_timestamp_uses_unknown_month() {
        assert_eq!(PathPlanner::month_bucket(None), UNKNOWN_MONTH);
    }

    #[test]
    fn test_plan_reads_file_mtime() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("algebra_notes.txt");
        let file = File::create(&file_path).expect("Failed to create file");
        let time = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        file.set_modified(SystemTime::from(time))
            .expect("Failed to set mtime");

        let record = FileRecord::read(&file_path);
        assert_eq!(record.name, "algebra_notes.txt");

        let destination = PathPlanner::plan(&record, "Math");
        assert_eq!(destination.category, "Math");
        assert_eq!(destination.month, "2024-03");
        assert_eq!(
            destination.folder(temp_dir.path()),
            temp_dir.path().join("Math").join("2024-03")
        );
    }

    #[test]
    fn test_vanished_file_plans_unknown_month() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let record = FileRecord::read(&temp_dir.path().join("gone.txt"));

        assert!(record.modified.is_none());
        let destination = PathPlanner::plan(&record, "Documents");
        assert_eq!(destination.month, UNKNOWN_MONTH);
    }
}
