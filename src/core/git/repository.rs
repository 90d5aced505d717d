use super::validation::GitValidator;
use crate::core::source::{BranchRecord, BranchSource};
use crate::utils::error::{Result, SweepError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const HEADS_PREFIX: &str = "refs/heads/";

/// A local repository driven through the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitRepository {
    pub root: PathBuf,
}

impl GitRepository {
    pub fn discover() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            SweepError::git_operation(format!("Failed to get current directory: {}", e))
        })?;

        Self::discover_from(&current_dir)
    }

    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .current_dir(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| SweepError::git_operation(format!("Failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SweepError::git_operation(format!(
                "Not a git repository or git not found: {}",
                stderr.trim()
            )));
        }

        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        Ok(Self { root })
    }

    pub fn get_current_branch(&self) -> Result<String> {
        execute_git_command(self, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// The remote's HEAD if an `origin` is configured, otherwise the first of
    /// `main` or `master` that exists locally.
    pub fn get_default_branch(&self) -> Result<String> {
        if let Ok(branch_ref) =
            execute_git_command(self, &["symbolic-ref", "refs/remotes/origin/HEAD"])
        {
            if let Some(branch_name) = branch_ref.strip_prefix("refs/remotes/origin/") {
                return Ok(branch_name.to_string());
            }
        }

        for candidate in ["main", "master"] {
            if self.branch_exists(candidate) {
                return Ok(candidate.to_string());
            }
        }

        Err(SweepError::git_operation(
            "No origin/HEAD and neither 'main' nor 'master' exists",
        ))
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        execute_git_command(
            self,
            &["show-ref", "--verify", "--quiet", &format!("{}{}", HEADS_PREFIX, name)],
        )
        .is_ok()
    }

    /// Local branch names in ref order.
    pub fn list_branch_names(&self) -> Result<Vec<String>> {
        let output = execute_git_command(
            self,
            &["for-each-ref", "--format=%(refname)", "refs/heads"],
        )?;

        Ok(output
            .lines()
            .filter_map(|line| line.trim().strip_prefix(HEADS_PREFIX))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn get_last_commit_time(&self, branch: &str) -> Result<DateTime<Utc>> {
        let reference = format!("{}{}", HEADS_PREFIX, branch);
        let output = execute_git_command(self, &["show", "-s", "--format=%cI", &reference])?;

        DateTime::parse_from_rfc3339(output.trim())
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .map_err(|e| {
                SweepError::git_operation(format!(
                    "Unparseable commit date '{}' for {}: {}",
                    output.trim(),
                    branch,
                    e
                ))
            })
    }

    pub fn force_delete_branch(&self, name: &str) -> Result<()> {
        GitValidator::validate_branch_name(name)?;

        let current_branch = self.get_current_branch()?;
        if current_branch == name {
            return Err(SweepError::git_operation(format!(
                "Cannot delete checked-out branch '{}'",
                name
            )));
        }

        execute_git_command(self, &["branch", "-D", name]).map(|_| ())
    }
}

impl BranchSource for GitRepository {
    fn default_branch_name(&self) -> Result<String> {
        self.get_default_branch()
    }

    fn list_all_branches(&self) -> Result<Vec<BranchRecord>> {
        let names = self.list_branch_names()?;
        debug!(count = names.len(), root = %self.root.display(), "listed local branches");
        Ok(names.into_iter().map(BranchRecord::new).collect())
    }

    fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>> {
        self.get_last_commit_time(branch)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.force_delete_branch(branch)
    }
}

pub fn execute_git_command(repo: &GitRepository, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(&repo.root)
        .args(args)
        .output()
        .map_err(|e| SweepError::git_operation(format!("Failed to execute git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SweepError::git_operation(format!(
            "Git command failed ({}): {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim().to_string())
}
