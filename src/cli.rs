//! Command-line interface module for coursetidy.
//!
//! This module handles:
//! - Argument parsing
//! - Prompting for the folder when none was given
//! - Merging command-line overrides into the loaded configuration
//! - Starting the organizer

use crate::config::OrganizerConfig;
use crate::mover::ConflictPolicy;
use crate::organizer::{Organizer, RunReport};
use crate::output::OutputFormatter;
use crate::run_log::LogPolicy;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort coursework into subject and month folders.
#[derive(Debug, Parser)]
#[command(name = "coursetidy", version, about)]
pub struct Cli {
    /// Folder to organize (asked for interactively when omitted)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub folder: Option<PathBuf>,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Keep or discard log entries from earlier runs
    #[arg(long, value_enum)]
    pub log_policy: Option<LogPolicy>,

    /// What to do when the destination already has a file with the same name
    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictPolicy>,

    /// Categories with fewer files than this are merged into the overflow folder
    #[arg(long)]
    pub min_files: Option<usize>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut OrganizerConfig) {
        if let Some(policy) = self.log_policy {
            config.organizer.log_policy = policy;
        }
        if let Some(policy) = self.on_conflict {
            config.organizer.on_conflict = policy;
        }
        if let Some(min_files) = self.min_files {
            config.organizer.min_files_to_keep = min_files;
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use coursetidy::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["coursetidy", "/path/to/coursework", "--dry-run"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<RunReport, String> {
    let mut config = OrganizerConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    cli.apply_overrides(&mut config);

    let folder = match &cli.folder {
        Some(folder) => folder.clone(),
        None => {
            let stdin = io::stdin();
            prompt_for_folder(&mut stdin.lock(), &mut io::stdout())?
        }
    };

    organize_with_config(&folder, config, cli.dry_run)
}

/// Compiles `config` and organizes `dir_path` with it.
pub fn organize_with_config(
    dir_path: &Path,
    config: OrganizerConfig,
    dry_run: bool,
) -> Result<RunReport, String> {
    let compiled = config
        .compile()
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    Organizer::new(dir_path, compiled, dry_run)
        .run()
        .map_err(|e| e.to_string())
}

/// Asks for the folder to organize on `output` and reads it from `input`.
pub fn prompt_for_folder<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, String> {
    write!(output, "Folder path to organize: ").map_err(|e| e.to_string())?;
    output.flush().map_err(|e| e.to_string())?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| format!("Could not read folder path: {}", e))?;

    let folder = line.trim();
    if folder.is_empty() {
        OutputFormatter::warning("No folder given.");
        return Err("No folder path provided".to_string());
    }

    Ok(PathBuf::from(folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_positional_folder_and_flag() {
        let cli = Cli::parse_from(["coursetidy", "/tmp/notes", "--dry-run"]);
        assert_eq!(cli.folder, Some(PathBuf::from("/tmp/notes")));
        assert!(cli.dry_run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_folder_is_optional() {
        let cli = Cli::parse_from(["coursetidy"]);
        assert!(cli.folder.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "coursetidy",
            "/tmp/notes",
            "--log-policy",
            "replace",
            "--on-conflict",
            "overwrite",
            "--min-files",
            "5",
        ]);
        let mut config = OrganizerConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.organizer.log_policy, LogPolicy::Replace);
        assert_eq!(config.organizer.on_conflict, ConflictPolicy::Overwrite);
        assert_eq!(config.organizer.min_files_to_keep, 5);
    }

    #[test]
    fn test_no_overrides_keep_config_values() {
        let cli = Cli::parse_from(["coursetidy"]);
        let mut config = OrganizerConfig::default();
        config.organizer.min_files_to_keep = 7;
        cli.apply_overrides(&mut config);

        assert_eq!(config.organizer.min_files_to_keep, 7);
        assert_eq!(config.organizer.log_policy, LogPolicy::Append);
    }

    #[test]
    fn test_prompt_reads_trimmed_path() {
        let mut input = Cursor::new("  /tmp/coursework \n");
        let mut output = Vec::new();

        let folder = prompt_for_folder(&mut input, &mut output).expect("prompt failed");

        assert_eq!(folder, PathBuf::from("/tmp/coursework"));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Folder path to organize: "
        );
    }

    #[test]
    fn test_prompt_rejects_empty_input() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();

        assert!(prompt_for_folder(&mut input, &mut output).is_err());
    }

    #[test]
    fn test_missing_folder_is_reported() {
        let result = organize_with_config(
            Path::new("/non/existent/coursework"),
            OrganizerConfig::default(),
            false,
        );
        assert!(result.is_err());
    }
}
