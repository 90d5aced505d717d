use crate::config::{parse_branch_list, ConfigOverrides, SourceKind};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "branch-sweep")]
#[command(about = "Delete branches whose last commit is older than a retention threshold")]
#[command(
    version,
    long_about = "Lists the branches of a repository and deletes those whose last commit is \
                  older than the configured threshold. The default branch, protected branches \
                  and branches matching the exclude pattern are always kept."
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate branches and delete the stale ones
    Run(RunArgs),
    /// Inspect or initialize configuration
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    # Preview what would be deleted in the current repository
    branch-sweep run --dry-run

    # Delete branches older than 30 days, keeping release branches
    branch-sweep run --days 30 --exclude '^release/'

    # Sweep a GitHub repository (token from GITHUB_TOKEN)
    branch-sweep run --source github --repo octo/widgets --format json")]
pub struct RunArgs {
    /// Config file (defaults to the user config directory)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Delete branches whose last commit is older than this many days
    #[arg(long, short = 'd', value_name = "DAYS")]
    pub days: Option<u32>,

    /// Report what would be deleted without deleting anything.
    /// `--dry-run=false` turns off a dry run set in the config file
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub dry_run: Option<bool>,

    /// Comma-separated branch names that are never deleted
    #[arg(long, value_name = "BRANCHES")]
    pub protected: Option<String>,

    /// Regular expression; matching branches are never deleted
    #[arg(long, short = 'e', value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Where branches come from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Local repository path for the git source
    #[arg(long, value_name = "DIR")]
    pub path: Option<String>,

    /// GitHub repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Report format on stdout
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also append deleted_branches/skipped_branches outputs to this file
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "FILE")]
    pub github_output: Option<PathBuf>,
}

impl RunArgs {
    pub fn validate(&self) -> crate::utils::Result<()> {
        if let Some(ref protected) = self.protected {
            if parse_branch_list(protected).is_empty() && !protected.trim().is_empty() {
                return Err(crate::utils::SweepError::invalid_args(
                    "--protected must list at least one branch name",
                ));
            }
        }
        Ok(())
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            days_old_threshold: self.days,
            dry_run: self.dry_run,
            protected_branches: self.protected.as_deref().map(parse_branch_list),
            exclude_pattern: self.exclude.clone(),
            source_kind: self.source,
            path: self.path.clone(),
            repository: self.repo.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Config file to read instead of the default location
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the default config file location
    Path,
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
        /// Where to write (defaults to the user config directory)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },
}
