use super::{Config, RetentionConfig, SourceConfig, SourceKind};
use std::path::PathBuf;

pub const DEFAULT_DAYS_OLD_THRESHOLD: u32 = 14;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub fn default_config() -> Config {
    Config {
        retention: default_retention_config(),
        source: default_source_config(),
    }
}

pub fn default_retention_config() -> RetentionConfig {
    RetentionConfig {
        days_old_threshold: DEFAULT_DAYS_OLD_THRESHOLD,
        dry_run: false,
        protected_branches: default_protected_branches(),
        exclude_pattern: None,
    }
}

pub fn default_source_config() -> SourceConfig {
    SourceConfig {
        kind: SourceKind::Git,
        path: None,
        repository: None,
        api_url: DEFAULT_GITHUB_API_URL.to_string(),
    }
}

pub fn default_protected_branches() -> Vec<String> {
    ["main", "master", "develop", "staging", "production"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "branch-sweep") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("branch-sweep")
    }
}

pub fn get_config_file_path() -> PathBuf {
    if let Ok(config_path) = std::env::var("BRANCH_SWEEP_CONFIG_PATH") {
        return PathBuf::from(config_path);
    }

    get_default_config_dir().join("config.json")
}
