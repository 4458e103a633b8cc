//! Configuration loading and file filtering.
//!
//! Settings come from an optional TOML file; command-line flags override
//! them afterwards (see [`crate::cli`]).
//!
//! # Configuration File Format
//!
//! ```toml
//! [organize]
//! target = "~/Downloads"
//! mode = "by-type"        # or "by-date"
//! dry_run = true
//!
//! [resume]
//! name_patterns = ["samia", "ibrahim"]
//!
//! [extensions]
//! avif = "Images"
//! epub = "Documents"
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["*.tmp"]
//! extensions = ["crdownload", "part"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::file_category::Category;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a run before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("Invalid glob pattern '{0}': expected something like *.tmp or report-??.pdf")]
    InvalidGlobPattern(String),
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    #[error("Target directory does not exist: {}", .0.display())]
    TargetNotFound(PathBuf),
    #[error("Target is not a directory: {}", .0.display())]
    TargetNotDirectory(PathBuf),
    #[error("Cannot read target directory {}: {source}", .path.display())]
    TargetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No target directory given and no downloads directory could be determined")]
    NoDefaultTarget,
}

/// How files are assigned to category folders.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizeMode {
    /// Filename rules, then extension.
    #[default]
    ByType,
    /// Creation year and month.
    ByDate,
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organize: OrganizeSettings,

    #[serde(default)]
    pub resume: ResumeSettings,

    /// Extra or overriding extension mappings, e.g. `avif = "Images"`.
    #[serde(default)]
    pub extensions: BTreeMap<String, Category>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// The `[organize]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeSettings {
    /// Directory to organize. Defaults to the user's downloads directory.
    #[serde(default)]
    pub target: Option<PathBuf>,

    #[serde(default)]
    pub mode: OrganizeMode,

    /// Only report planned moves. On unless explicitly disabled.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

fn default_dry_run() -> bool {
    true
}

impl Default for OrganizeSettings {
    fn default() -> Self {
        Self {
            target: None,
            mode: OrganizeMode::default(),
            dry_run: default_dry_run(),
        }
    }
}

/// The `[resume]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeSettings {
    /// Case-insensitive regexes matching the owner's name. When non-empty,
    /// a resume must match one of them.
    #[serde(default)]
    pub name_patterns: Vec<String>,
}

/// The `[filters]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Rules for leaving files in place.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules that override exclude rules (whitelist).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files out of organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the filename (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "part", "crdownload").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dlsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dlsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found is not valid.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".dlsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("dlsort").join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Chooses the directory to organize.
///
/// Precedence: explicit argument, then the configured target, then the
/// platform downloads directory, then `~/Downloads`. A leading `~` is
/// expanded.
pub fn resolve_target(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit.or(configured) {
        return Ok(expand_tilde(path));
    }
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or(ConfigError::NoDefaultTarget)
}

/// Checks that `path` is an existing directory.
pub fn validate_target(path: &Path) -> Result<(), ConfigError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::TargetNotFound(path.to_path_buf()),
        _ => ConfigError::TargetUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::TargetNotDirectory(path.to_path_buf()));
    }
    Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Compiled filter rules.
///
/// Patterns are parsed once so each file check is a handful of lookups.
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Check if a file should be organized.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, include
    /// 2. Exact filename match - if matched, exclude
    /// 3. File extension match - if matched, exclude
    /// 4. Glob pattern match - if matched, exclude
    /// 5. Regex pattern match - if matched, exclude
    /// 6. Default: include
    ///
    /// Hidden files are dropped before this is consulted.
    pub fn should_include(&self, file_name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some(ext) = Path::new(file_name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|re| re.is_match(file_name))
    }
}
