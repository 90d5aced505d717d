use super::defaults::{default_config, get_config_file_path};
use super::{Config, ConfigLoader, Result, SourceKind};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct ConfigManager;

impl ConfigManager {
    pub fn get_config_path() -> PathBuf {
        get_config_file_path()
    }

    /// Loads the config file if present, otherwise returns the defaults without
    /// touching the filesystem.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => get_config_file_path(),
        };

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(default_config())
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }
}

/// Values supplied on the command line or through the environment. Anything
/// set here wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub days_old_threshold: Option<u32>,
    pub dry_run: Option<bool>,
    pub protected_branches: Option<Vec<String>>,
    pub exclude_pattern: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub path: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(days) = self.days_old_threshold {
            config.retention.days_old_threshold = days;
        }
        if let Some(dry_run) = self.dry_run {
            config.retention.dry_run = dry_run;
        }
        if let Some(ref protected) = self.protected_branches {
            config.retention.protected_branches = protected.clone();
        }
        if let Some(ref pattern) = self.exclude_pattern {
            // An empty pattern on the command line clears a configured one.
            config.retention.exclude_pattern = if pattern.is_empty() {
                None
            } else {
                Some(pattern.clone())
            };
        }
        if let Some(kind) = self.source_kind {
            config.source.kind = kind;
        }
        if let Some(ref path) = self.path {
            config.source.path = Some(path.clone());
        }
        if let Some(ref repository) = self.repository {
            config.source.repository = Some(repository.clone());
        }
        if let Some(ref api_url) = self.api_url {
            config.source.api_url = api_url.clone();
        }
    }
}

/// Reads the JSON config file (or defaults) and layers overrides on top.
#[derive(Debug, Clone, Default)]
pub struct FileConfigLoader {
    path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl FileConfigLoader {
    pub fn new(path: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self { path, overrides }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<Config> {
        let mut config = match self.path {
            // An explicitly named file must exist.
            Some(ref path) => ConfigManager::load_from_file(path)?,
            None => ConfigManager::load_or_default(None)?,
        };
        self.overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
