use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod defaults;
pub mod manager;
pub mod validation;

pub use manager::{ConfigManager, ConfigOverrides, FileConfigLoader};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub retention: RetentionConfig,
    pub source: SourceConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetentionConfig {
    pub days_old_threshold: u32,
    pub dry_run: bool,
    pub protected_branches: Vec<String>,
    pub exclude_pattern: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Git,
    Github,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Local repository path for the `git` source. Defaults to the current directory.
    pub path: Option<String>,
    /// `owner/name` for the `github` source.
    pub repository: Option<String>,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        defaults::default_config()
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        defaults::default_retention_config()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        defaults::default_source_config()
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Supplies the configuration for a run.
pub trait ConfigLoader {
    fn load(&self) -> Result<Config>;
}

impl ConfigLoader for Config {
    fn load(&self) -> Result<Config> {
        self.validate()?;
        Ok(self.clone())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

/// Splits a comma-separated branch list, trimming entries and dropping empties.
pub fn parse_branch_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
