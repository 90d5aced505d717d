use crate::utils::Result;
use chrono::{DateTime, Utc};

/// A branch as returned by a listing. Only the name is known up front; the
/// last-commit time is fetched per branch, and only when a decision needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub name: String,
}

impl BranchRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read and delete access to the branches of one repository.
///
/// `default_branch_name` and `list_all_branches` failing aborts a run.
/// `last_commit_timestamp` and `delete_branch` failures are recorded against
/// the single branch involved. Implementations must return every branch from
/// `list_all_branches`, following pagination internally. Retries, if any,
/// belong here rather than in the caller.
pub trait BranchSource {
    fn default_branch_name(&self) -> Result<String>;
    fn list_all_branches(&self) -> Result<Vec<BranchRecord>>;
    fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>>;
    fn delete_branch(&self, branch: &str) -> Result<()>;
}

impl<S: BranchSource + ?Sized> BranchSource for &S {
    fn default_branch_name(&self) -> Result<String> {
        (**self).default_branch_name()
    }

    fn list_all_branches(&self) -> Result<Vec<BranchRecord>> {
        (**self).list_all_branches()
    }

    fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>> {
        (**self).last_commit_timestamp(branch)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        (**self).delete_branch(branch)
    }
}

impl<S: BranchSource + ?Sized> BranchSource for Box<S> {
    fn default_branch_name(&self) -> Result<String> {
        (**self).default_branch_name()
    }

    fn list_all_branches(&self) -> Result<Vec<BranchRecord>> {
        (**self).list_all_branches()
    }

    fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>> {
        (**self).last_commit_timestamp(branch)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        (**self).delete_branch(branch)
    }
}
