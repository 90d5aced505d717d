use crate::cli::parser::{ConfigArgs, ConfigCommands};
use crate::config::defaults::default_config;
use crate::config::{ConfigLoader, ConfigManager, ConfigOverrides, FileConfigLoader};
use crate::utils::{Result, SweepError};
use std::path::{Path, PathBuf};

pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        Some(ConfigCommands::Show { config }) => execute_show(config),
        Some(ConfigCommands::Path) => execute_path(),
        Some(ConfigCommands::Init { force, config }) => {
            let path = config.unwrap_or_else(ConfigManager::get_config_path);
            execute_init(&path, force)
        }
        None => execute_show(None),
    }
}

fn execute_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = FileConfigLoader::new(config_path, ConfigOverrides::default())
        .load()
        .map_err(|e| SweepError::config_error(format!("Failed to load configuration: {e}")))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn execute_path() -> Result<()> {
    println!("{}", ConfigManager::get_config_path().display());
    Ok(())
}

fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SweepError::invalid_args(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }

    ConfigManager::save_to_path(&default_config(), path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}
