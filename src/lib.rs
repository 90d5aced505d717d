pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::Config;
pub use crate::core::git::GitRepository;
pub use crate::core::github::GithubSource;
pub use crate::core::retention::{Reporter, RetentionEngine, RunReport, SkipReason};
pub use crate::core::source::{BranchRecord, BranchSource};
pub use crate::utils::{Result, SweepError};
