use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    #[error("{}", format_api_error(.status, .message))]
    Api { status: Option<u16>, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("Could not resolve default branch: {message}")]
    DefaultBranchUnavailable { message: String },

    #[error("Could not list branches: {message}")]
    BranchListingFailed { message: String },

    #[error("Invalid branch name: {name} - {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;

fn format_api_error(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API request failed (HTTP {}): {}", code, message),
        None => format!("API request failed: {}", message),
    }
}

impl SweepError {
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }

    pub fn default_branch_unavailable(message: impl Into<String>) -> Self {
        Self::DefaultBranchUnavailable {
            message: message.into(),
        }
    }

    pub fn branch_listing_failed(message: impl Into<String>) -> Self {
        Self::BranchListingFailed {
            message: message.into(),
        }
    }

    pub fn invalid_branch_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBranchName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors abort a whole run. Everything else is recorded against a
    /// single branch and processing continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DefaultBranchUnavailable { .. } | Self::BranchListingFailed { .. }
        )
    }
}

impl From<crate::config::ConfigError> for SweepError {
    fn from(error: crate::config::ConfigError) -> Self {
        Self::Config {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for SweepError {
    fn from(error: reqwest::Error) -> Self {
        Self::Api {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}
