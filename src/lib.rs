//! coursetidy - sort coursework into subject and month folders
//!
//! This library classifies files by keywords in their names, moves them into
//! `<category>/<YYYY-MM>/` folders under the organized directory, folds
//! categories with too few files into a catch-all folder and keeps a JSON log
//! of every move and folder removal. A dry-run mode announces all of this
//! without touching the filesystem.

pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod folder_store;
pub mod merger;
pub mod mover;
pub mod organizer;
pub mod output;
pub mod path_planner;
pub mod run_log;

pub use category::{CategoryRule, Classifier};
pub use config::{CompiledConfig, ConfigError, OrganizerConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use mover::{ConflictPolicy, Mover};
pub use organizer::{CategoryTally, Organizer, RunReport};
pub use run_log::{LogEntry, LogPolicy, RunLog};

pub use cli::{Cli, run_cli};
