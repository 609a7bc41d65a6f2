//! Run configuration loaded from TOML.
//!
//! Controls the name of the output folder and which image files are left out
//! of a run. Filters can only remove files; a file still needs an image
//! extension to be picked up.
//!
//! # Configuration File Format
//!
//! ```toml
//! [output]
//! target_dir_name = "organized"
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["thumbnails/**"]
//! regex = ["^~"]
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the folder created next to the source directory.
pub const DEFAULT_TARGET_DIR_NAME: &str = "organized";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure, or an unusable value.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeConfig {
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// Where organized copies are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Folder created beside the source directory.
    #[serde(default = "default_target_dir_name")]
    pub target_dir_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            target_dir_name: default_target_dir_name(),
        }
    }
}

fn default_target_dir_name() -> String {
    DEFAULT_TARGET_DIR_NAME.to_string()
}

/// Rules deciding which eligible files are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether names starting with "." are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
        }
    }
}

fn default_enable_hidden_files() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to skip (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the source directory.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl OrganizeConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.datefoldrc.toml` in the current directory
    /// 3. `~/.config/datefold/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".datefoldrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("datefold")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        log::debug!("loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The target folder name must be a single, ordinary path component.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.output.target_dir_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(ConfigError::ConfigInvalid(format!(
                "target_dir_name '{}' must be a plain folder name",
                name
            )));
        }
        Ok(())
    }

    /// Compile the filter rules for matching.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with patterns pre-compiled.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

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
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Check whether a file survives the filters.
    ///
    /// `relative_path` is the file's path relative to the source directory.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
