//! Console output for a run.
//!
//! Every console line the organizer prints goes through [`OutputFormatter`].
//! Errors go to stderr with an `[ERROR]` tag, preview notices carry a
//! `[DRY-RUN]` tag, so the two can be told apart from ordinary status lines
//! when scraping a run's output.

use crate::organizer::CategoryTally;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Tag prepended to every error line.
pub const ERROR_TAG: &str = "[ERROR]";
/// Tag prepended to every preview notice.
pub const DRY_RUN_TAG: &str = "[DRY-RUN]";

/// Console output helpers; stateless, so every method is an associated fn.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green check line for a completed action.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use coursetidy::output::OutputFormatter;
    /// OutputFormatter::success("Moved: algebra_notes.txt → Math/2024-03");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message to stderr, tagged `[ERROR]`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use coursetidy::output::OutputFormatter;
    /// OutputFormatter::error("Could not move bio_lab.pdf");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {} {}", "✗".red(), ERROR_TAG.red().bold(), message);
    }

    /// Yellow line for a recoverable problem.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a preview notice, tagged `[DRY-RUN]`.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("{} {}", DRY_RUN_TAG, message).yellow());
    }

    /// Creates a progress bar for the per-file pass.
    ///
    /// Callers print through [`ProgressBar::suspend`] so status lines do not
    /// tear the bar. When stderr is not a terminal the bar draws nothing.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the per-category tally of the pass as a table.
    ///
    /// Rows come in name order; a merged category is marked with the
    /// overflow folder that absorbed it.
    pub fn summary_table(tally: &CategoryTally, merged: &[String], overflow: &str) {
        Self::header("SUMMARY");

        let width = tally
            .iter()
            .map(|(name, _)| name.len())
            .chain(std::iter::once("Category".len()))
            .max()
            .unwrap_or_default();
        let rule = "-".repeat(width + 10);

        println!("{:<width$} | {}", "Category".bold(), "Files".bold());
        println!("{rule}");

        for (category, count) in tally.iter() {
            let mut row = format!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                files_word(count)
            );
            if merged.iter().any(|m| m == category) {
                row.push_str(&format!(" (merged into {})", overflow).yellow().to_string());
            }
            println!("{row}");
        }

        let total = tally.total();
        println!("{rule}");
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            files_word(total)
        );
    }
}

fn files_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
