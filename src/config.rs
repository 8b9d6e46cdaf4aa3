//! Organizer configuration loaded from TOML.
//!
//! Everything has a built-in default, so a configuration file is optional.
//! A file may override the organizer settings, replace the category table
//! and add file filters:
//!
//! ```toml
//! [organizer]
//! min_files_to_keep = 3
//! fallback_category = "Other"
//! overflow_category = "Misc"
//! log_file = "organizer_log.json"
//! log_policy = "append"     # or "replace"
//! on_conflict = "skip"      # or "overwrite"
//!
//! [[categories]]
//! name = "Math"
//! keywords = ["math", "algebra", "calc"]
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::category::{CategoryRule, Classifier, DEFAULT_FALLBACK_CATEGORY, default_rules};
use crate::mover::ConflictPolicy;
use crate::run_log::{DEFAULT_LOG_FILE, LogPolicy};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".coursetidyrc.toml";

/// Problems found while reading or validating a configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly named file does not exist.
    ConfigNotFound(PathBuf),
    /// The file is not valid TOML or has the wrong shape.
    ConfigInvalid(String),
    /// A category, fallback or overflow label cannot be used as a folder name.
    InvalidFolderName(String),
    /// A category rule has an empty keyword, which would match every file.
    EmptyKeyword(String),
    InvalidGlobPattern(String),
    InvalidRegexPattern { pattern: String, reason: String },
    /// Reading the file failed.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => write!(f, "No config file at {}", path.display()),
            ConfigError::ConfigInvalid(msg) => write!(f, "Malformed configuration: {}", msg),
            ConfigError::InvalidFolderName(name) => {
                write!(f, "'{}' cannot be used as a folder name", name)
            }
            ConfigError::EmptyKeyword(category) => {
                write!(f, "Category '{}' has an empty keyword", category)
            }
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Bad glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Bad regex '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "Could not read configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub organizer: OrganizerSettings,

    /// Category rules in evaluation order. Replaces the built-in table.
    #[serde(default = "default_rules")]
    pub categories: Vec<CategoryRule>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Settings that drive a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerSettings {
    /// Categories with fewer files than this in a pass are merged.
    #[serde(default = "default_min_files_to_keep")]
    pub min_files_to_keep: usize,

    /// Label for files that match no rule.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,

    /// Folder that absorbs merged categories.
    #[serde(default = "default_overflow_category")]
    pub overflow_category: String,

    /// Name of the run log inside the organized root.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default)]
    pub log_policy: LogPolicy,

    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

fn default_min_files_to_keep() -> usize {
    3
}

fn default_fallback_category() -> String {
    DEFAULT_FALLBACK_CATEGORY.to_string()
}

fn default_overflow_category() -> String {
    "Misc".to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            min_files_to_keep: default_min_files_to_keep(),
            fallback_category: default_fallback_category(),
            overflow_category: default_overflow_category(),
            log_file: default_log_file(),
            log_policy: LogPolicy::default(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

/// Rules deciding which top-level files are organized at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Organize dot-files too. Off by default.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Patterns that are organized even when an exclude rule matches.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, case-insensitive (e.g., "bak").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            organizer: OrganizerSettings::default(),
            categories: default_rules(),
            filters: FilterRules::default(),
        }
    }
}

impl OrganizerConfig {
    /// Finds and reads the configuration for this run.
    ///
    /// An explicit `config_path` wins. Without one, `.coursetidyrc.toml` in the
    /// working directory is tried, then `$HOME/.config/coursetidy/config.toml`.
    /// When neither exists the built-in defaults are used.
    ///
    /// # Errors
    ///
    /// Fails when the chosen file is missing (explicit path only), unreadable
    /// or malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("coursetidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Reads and parses one configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validate and compile the configuration for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if a label is not a usable folder name, a keyword is
    /// empty, or a glob/regex pattern is invalid.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let settings = self.organizer;
        validate_folder_name(&settings.fallback_category)?;
        validate_folder_name(&settings.overflow_category)?;
        validate_folder_name(&settings.log_file)?;

        for rule in &self.categories {
            validate_folder_name(&rule.name)?;
            if rule.keywords.iter().any(|kw| kw.is_empty()) {
                return Err(ConfigError::EmptyKeyword(rule.name.clone()));
            }
        }

        let classifier = Classifier::new(self.categories, settings.fallback_category.clone());
        let filters = CompiledFilters::new(self.filters)?;

        Ok(CompiledConfig {
            settings,
            classifier,
            filters,
        })
    }
}

/// Labels become folder names directly under the root, so each must be a
/// single normal path segment.
fn validate_folder_name(name: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(ConfigError::InvalidFolderName(name.to_string())),
    }
}

/// Validated configuration, ready to drive an [`Organizer`](crate::organizer::Organizer).
#[derive(Debug, Default)]
pub struct CompiledConfig {
    pub settings: OrganizerSettings,
    pub classifier: Classifier,
    pub filters: CompiledFilters,
}

/// Filter rules with their patterns compiled once per run.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    hidden_allowed: bool,
    skip_names: HashSet<String>,
    skip_extensions: HashSet<String>,
    skip_globs: Vec<Pattern>,
    skip_regexes: Vec<Regex>,
    keep_globs: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|raw| Pattern::new(raw).map_err(|_| ConfigError::InvalidGlobPattern(raw.clone())))
        .collect()
}

fn compile_regexes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|raw| {
            Regex::new(raw).map_err(|e| ConfigError::InvalidRegexPattern {
                pattern: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let FilterRules {
            enable_hidden_files,
            exclude,
            include,
        } = rules;

        Ok(Self {
            hidden_allowed: enable_hidden_files,
            skip_globs: compile_globs(&exclude.patterns)?,
            skip_regexes: compile_regexes(&exclude.regex)?,
            keep_globs: compile_globs(&include.patterns)?,
            skip_extensions: exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_names: exclude.filenames.into_iter().collect(),
        })
    }

    /// Whether a top-level file (path relative to the root) takes part in the run.
    ///
    /// An include pattern wins over everything else. Otherwise the file is
    /// left alone when it is hidden (unless enabled) or matches any exclude
    /// rule.
    pub fn should_include(&self, file_path: &Path) -> bool {
        if self.keep_globs.iter().any(|glob| glob.matches_path(file_path)) {
            return true;
        }
        !self.is_excluded(file_path)
    }

    fn is_excluded(&self, file_path: &Path) -> bool {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let extension = file_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        (!self.hidden_allowed && name.starts_with('.'))
            || self.skip_names.contains(name.as_ref())
            || extension.is_some_and(|ext| self.skip_extensions.contains(&ext))
            || self.skip_globs.iter().any(|glob| glob.matches_path(file_path))
            || self.skip_regexes.iter().any(|re| re.is_match(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builtin_behavior() {
        let config = OrganizerConfig::default();
        assert_eq!(config.organizer.min_files_to_keep, 3);
        assert_eq!(config.organizer.fallback_category, "Other");
        assert_eq!(config.organizer.overflow_category, "Misc");
        assert_eq!(config.organizer.log_file, "organizer_log.json");
        assert_eq!(config.organizer.log_policy, LogPolicy::Append);
        assert_eq!(config.organizer.on_conflict, ConflictPolicy::Skip);
        assert_eq!(config.categories, default_rules());
        assert!(!config.filters.enable_hidden_files);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = OrganizerConfig::from_toml("").expect("Failed to parse");
        assert_eq!(config.organizer, OrganizerSettings::default());
        assert_eq!(config.categories.len(), 8);
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        let config = OrganizerConfig::from_toml(
            r#"
            [organizer]
            min_files_to_keep = 5
            log_policy = "replace"
            on_conflict = "overwrite"
            "#,
        )
        .expect("Failed to parse");

        assert_eq!(config.organizer.min_files_to_keep, 5);
        assert_eq!(config.organizer.log_policy, LogPolicy::Replace);
        assert_eq!(config.organizer.on_conflict, ConflictPolicy::Overwrite);
        assert_eq!(config.organizer.overflow_category, "Misc");
    }

    #[test]
    fn test_categories_replace_default_table_in_order() {
        let config = OrganizerConfig::from_toml(
            r#"
            [[categories]]
            name = "Music"
            keywords = ["Guitar", "piano"]

            [[categories]]
            name = "Sport"
            keywords = ["soccer"]
            "#,
        )
        .expect("Failed to parse");

        let compiled = config.compile().expect("Failed to compile");
        let names: Vec<&str> = compiled
            .classifier
            .rules()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Music", "Sport"]);
        assert_eq!(compiled.classifier.classify("GUITAR_tabs.pdf"), "Music");
        assert_eq!(compiled.classifier.classify("algebra.txt"), "Other");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = OrganizerConfig::from_toml(
            r#"
            [organizer]
            log_policy = "sometimes"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_folder_names_must_be_single_segments() {
        for bad in ["", "..", ".", "a/b", "../escape", "/abs"] {
            let mut config = OrganizerConfig::default();
            config.organizer.overflow_category = bad.to_string();
            assert!(
                matches!(config.compile(), Err(ConfigError::InvalidFolderName(_))),
                "'{}' should be rejected",
                bad
            );
        }

        let mut config = OrganizerConfig::default();
        config.categories = vec![CategoryRule::new("Math/Calc", &["calc"])];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidFolderName(_))
        ));
    }

    #[test]
    fn test_empty_keyword_is_rejected() {
        let mut config = OrganizerConfig::default();
        config.categories = vec![CategoryRule::new("Everything", &[""])];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::EmptyKeyword(_))
        ));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = OrganizerConfig::load(Some(Path::new("/non/existent/coursetidy.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_hidden_file_excluded_by_default() {
        let compiled = OrganizerConfig::default().compile().unwrap();

        assert!(!compiled.filters.should_include(Path::new(".DS_Store")));
        assert!(compiled.filters.should_include(Path::new("algebra_notes.txt")));
    }

    #[test]
    fn test_exclude_rules() {
        let mut config = OrganizerConfig::default();
        config.filters = FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                filenames: vec!["desktop.ini".to_string()],
                patterns: vec!["draft_*".to_string()],
                extensions: vec![".BAK".to_string()],
                regex: vec![r"^~\$".to_string()],
            },
            include: IncludeRules::default(),
        };
        let compiled = config.compile().unwrap();

        assert!(!compiled.filters.should_include(Path::new("desktop.ini")));
        assert!(!compiled.filters.should_include(Path::new("draft_essay.docx")));
        assert!(!compiled.filters.should_include(Path::new("notes.bak")));
        assert!(!compiled.filters.should_include(Path::new("~$essay.docx")));
        assert!(compiled.filters.should_include(Path::new(".hidden_notes")));
        assert!(compiled.filters.should_include(Path::new("essay.docx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let mut config = OrganizerConfig::default();
        config.filters.exclude.extensions = vec!["tmp".to_string()];
        config.filters.include.patterns = vec!["keep_*.tmp".to_string()];
        let compiled = config.compile().unwrap();

        assert!(compiled.filters.should_include(Path::new("keep_me.tmp")));
        assert!(!compiled.filters.should_include(Path::new("scratch.tmp")));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let mut config = OrganizerConfig::default();
        config.filters.exclude.regex = vec!["[invalid(".to_string()];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let mut config = OrganizerConfig::default();
        config.filters.exclude.patterns = vec!["[invalid".to_string()];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }
}
