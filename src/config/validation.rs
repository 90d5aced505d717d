use super::{Config, ConfigError, Result, RetentionConfig, SourceConfig, SourceKind};

pub fn validate_config(config: &Config) -> Result<()> {
    validate_retention_config(&config.retention)?;
    validate_source_config(&config.source)?;
    Ok(())
}

/// An exclude pattern that fails to compile is deliberately not rejected here:
/// the engine degrades it to never-matching and keeps going.
pub fn validate_retention_config(retention: &RetentionConfig) -> Result<()> {
    if let Some(empty) = retention
        .protected_branches
        .iter()
        .position(|name| name.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "protected branch entry {} is empty",
            empty + 1
        )));
    }

    Ok(())
}

pub fn validate_source_config(source: &SourceConfig) -> Result<()> {
    if source.kind != SourceKind::Github {
        return Ok(());
    }

    if source.api_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "GitHub API URL cannot be empty".to_string(),
        ));
    }

    match source.repository.as_deref() {
        Some(repository) => validate_repository_slug(repository),
        None => Err(ConfigError::Validation(
            "GitHub source requires a repository (owner/name)".to_string(),
        )),
    }
}

pub fn validate_repository_slug(repository: &str) -> Result<()> {
    let mut parts = repository.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "repository '{}' must have the form owner/name",
            repository
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_config;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&default_config()).is_ok());
    }

    #[test]
    fn test_empty_protected_entry_rejected() {
        let mut config = default_config();
        config.retention.protected_branches.push("  ".to_string());

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("protected branch entry 6 is empty"));
    }

    #[test]
    fn test_invalid_exclude_pattern_is_accepted() {
        let mut config = default_config();
        config.retention.exclude_pattern = Some("[unclosed".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_github_source_requires_repository() {
        let mut config = default_config();
        config.source.kind = SourceKind::Github;
        assert!(validate_config(&config).is_err());

        config.source.repository = Some("octo/widgets".to_string());
        assert!(validate_config(&config).is_ok());

        config.source.api_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_repository_slug_forms() {
        assert!(validate_repository_slug("octo/widgets").is_ok());
        assert!(validate_repository_slug("widgets").is_err());
        assert!(validate_repository_slug("octo/").is_err());
        assert!(validate_repository_slug("/widgets").is_err());
        assert!(validate_repository_slug("a/b/c").is_err());
    }
}
