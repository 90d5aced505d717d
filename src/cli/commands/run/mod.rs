use crate::cli::parser::{OutputFormat, RunArgs};
use crate::config::{Config, ConfigLoader, FileConfigLoader, SourceKind};
use crate::core::git::GitRepository;
use crate::core::github::GithubSource;
use crate::core::retention::{Reporter, RetentionEngine, RunReport};
use crate::core::source::BranchSource;
use crate::utils::{Result, SweepError};
use std::path::Path;

pub mod reporter;

use reporter::{GithubOutputReporter, JsonReporter, ReporterSet, TextReporter};

pub fn execute(args: RunArgs) -> Result<()> {
    args.validate()?;

    let loader = FileConfigLoader::new(args.config.clone(), args.overrides());
    let config = loader.load()?;
    let mut reporters = build_reporters(&args);

    sweep_with_config(&config, args.token.clone(), &mut reporters).map(|_| ())
}

fn build_reporters(args: &RunArgs) -> ReporterSet {
    let reporters = match args.format {
        OutputFormat::Text => ReporterSet::new().add(Box::new(TextReporter::stdout())),
        OutputFormat::Json => ReporterSet::new().add(Box::new(JsonReporter::stdout())),
    };

    match args.github_output {
        Some(ref path) => reporters.add(Box::new(GithubOutputReporter::new(path.clone()))),
        None => reporters,
    }
}

/// Opens the configured branch source and runs one sweep against it.
pub fn sweep_with_config(
    config: &Config,
    token: Option<String>,
    reporter: &mut dyn Reporter,
) -> Result<RunReport> {
    match config.source.kind {
        SourceKind::Git => {
            let repo = match config.source.path {
                Some(ref path) => GitRepository::discover_from(Path::new(path))?,
                None => GitRepository::discover()?,
            };
            sweep(&repo, config, reporter)
        }
        SourceKind::Github => {
            let repository = config.source.repository.as_deref().ok_or_else(|| {
                SweepError::config_error("GitHub source requires a repository (owner/name)")
            })?;
            let source = GithubSource::new(&config.source.api_url, repository, token)?;
            sweep(&source, config, reporter)
        }
    }
}

pub fn sweep<S: BranchSource + ?Sized>(
    source: &S,
    loader: &dyn ConfigLoader,
    reporter: &mut dyn Reporter,
) -> Result<RunReport> {
    RetentionEngine::from_loader(source, loader)?.execute(reporter)
}
