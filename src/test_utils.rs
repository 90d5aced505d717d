pub mod test_helpers {
    use crate::core::retention::{Reporter, RunReport};
    use crate::core::source::{BranchRecord, BranchSource};
    use crate::utils::{Result, SweepError};
    use chrono::{DateTime, Duration, Utc};
    use std::cell::RefCell;
    use std::collections::HashSet;

    pub fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    struct FakeBranch {
        name: String,
        /// `None` makes the commit lookup fail.
        last_commit: Option<DateTime<Utc>>,
    }

    /// In-memory branch source. Records every lookup and delete attempt, and
    /// actually removes branches on successful deletes.
    pub struct FakeBranchSource {
        default_branch: Option<String>,
        listing_fails: bool,
        branches: RefCell<Vec<FakeBranch>>,
        failing_deletes: HashSet<String>,
        forbidden_lookups: HashSet<String>,
        lookups: RefCell<Vec<String>>,
        deletions: RefCell<Vec<String>>,
    }

    impl FakeBranchSource {
        pub fn new(default_branch: &str) -> Self {
            Self {
                default_branch: Some(default_branch.to_string()),
                listing_fails: false,
                branches: RefCell::new(Vec::new()),
                failing_deletes: HashSet::new(),
                forbidden_lookups: HashSet::new(),
                lookups: RefCell::new(Vec::new()),
                deletions: RefCell::new(Vec::new()),
            }
        }

        pub fn unreachable_default_branch() -> Self {
            Self {
                default_branch: None,
                ..Self::new("")
            }
        }

        pub fn with_branch(self, name: &str, last_commit: DateTime<Utc>) -> Self {
            self.branches.borrow_mut().push(FakeBranch {
                name: name.to_string(),
                last_commit: Some(last_commit),
            });
            self
        }

        pub fn with_broken_branch(self, name: &str) -> Self {
            self.branches.borrow_mut().push(FakeBranch {
                name: name.to_string(),
                last_commit: None,
            });
            self
        }

        pub fn failing_delete(mut self, name: &str) -> Self {
            self.failing_deletes.insert(name.to_string());
            self
        }

        /// Panics if the commit date of `name` is ever requested.
        pub fn forbid_lookup(mut self, name: &str) -> Self {
            self.forbidden_lookups.insert(name.to_string());
            self
        }

        pub fn failing_listing(mut self) -> Self {
            self.listing_fails = true;
            self
        }

        pub fn lookups(&self) -> Vec<String> {
            self.lookups.borrow().clone()
        }

        pub fn deletions(&self) -> Vec<String> {
            self.deletions.borrow().clone()
        }

        pub fn deletion_count(&self) -> usize {
            self.deletions.borrow().len()
        }

        pub fn has_branch(&self, name: &str) -> bool {
            self.branches.borrow().iter().any(|b| b.name == name)
        }
    }

    impl BranchSource for FakeBranchSource {
        fn default_branch_name(&self) -> Result<String> {
            self.default_branch
                .clone()
                .ok_or_else(|| SweepError::api_status(503, "repository unreachable"))
        }

        fn list_all_branches(&self) -> Result<Vec<BranchRecord>> {
            if self.listing_fails {
                return Err(SweepError::api_status(500, "listing failed"));
            }
            Ok(self
                .branches
                .borrow()
                .iter()
                .map(|b| BranchRecord::new(b.name.clone()))
                .collect())
        }

        fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>> {
            if self.forbidden_lookups.contains(branch) {
                panic!("commit date of '{}' must not be fetched", branch);
            }
            self.lookups.borrow_mut().push(branch.to_string());

            self.branches
                .borrow()
                .iter()
                .find(|b| b.name == branch)
                .and_then(|b| b.last_commit)
                .ok_or_else(|| SweepError::api_status(404, format!("no commit for {}", branch)))
        }

        fn delete_branch(&self, branch: &str) -> Result<()> {
            self.deletions.borrow_mut().push(branch.to_string());
            if self.failing_deletes.contains(branch) {
                return Err(SweepError::api_status(422, "branch is protected on the host"));
            }
            self.branches.borrow_mut().retain(|b| b.name != branch);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingReporter {
        pub reports: Vec<RunReport>,
    }

    impl Reporter for RecordingReporter {
        fn report(&mut self, report: &RunReport) -> Result<()> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    #[cfg(test)]
    pub use git_fixtures::*;

}
