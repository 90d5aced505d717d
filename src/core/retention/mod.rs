//! The retention decision engine.
//!
//! One engine handles one run: it resolves the default branch, fixes a cutoff
//! from the run's start time, then walks the branch listing once in order,
//! classifying each branch and deleting the stale ones unless in dry-run mode.
//! Failures on a single branch become skip entries; only failing to resolve
//! the default branch or to list branches aborts the run.

pub mod policy;
pub mod report;

pub use policy::{classify_age, cutoff, days_old, Classification, RetentionPolicy};
pub use report::{Reporter, RunReport, SkipReason, SkippedBranch};

use crate::config::{ConfigLoader, RetentionConfig};
use crate::core::source::BranchSource;
use crate::utils::{Result, SweepError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub struct RetentionEngine<'a, S: BranchSource + ?Sized> {
    source: &'a S,
    policy: RetentionPolicy,
    report: RunReport,
}

impl<'a, S: BranchSource + ?Sized> RetentionEngine<'a, S> {
    pub fn new(source: &'a S, config: &RetentionConfig) -> Self {
        let policy = RetentionPolicy::from_config(config);
        let report = RunReport::new(policy.is_dry_run());
        Self {
            source,
            policy,
            report,
        }
    }

    pub fn from_loader(source: &'a S, loader: &dyn ConfigLoader) -> Result<Self> {
        let config = loader.load()?;
        Ok(Self::new(source, &config.retention))
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Runs and hands the finished report to `reporter`. A fatal error means
    /// nothing is reported.
    pub fn execute(self, reporter: &mut dyn Reporter) -> Result<RunReport> {
        let report = self.run()?;
        reporter.report(&report)?;
        Ok(report)
    }

    pub fn run(self) -> Result<RunReport> {
        self.run_at(Utc::now())
    }

    /// Runs with `started_at` as the reference instant for the cutoff.
    pub fn run_at(mut self, started_at: DateTime<Utc>) -> Result<RunReport> {
        let default_branch = self
            .source
            .default_branch_name()
            .map_err(|e| fatal(e, |message| SweepError::default_branch_unavailable(message)))?;
        if self.policy.protect(&default_branch) {
            debug!(branch = %default_branch, "default branch added to protected set");
        }

        let cutoff = self.policy.cutoff(started_at);
        info!(
            default_branch = %default_branch,
            days_old_threshold = self.policy.days_old_threshold(),
            cutoff = %cutoff.to_rfc3339(),
            exclude_pattern = self.policy.has_exclude_pattern(),
            dry_run = self.policy.is_dry_run(),
            "starting branch sweep"
        );

        let branches = self
            .source
            .list_all_branches()
            .map_err(|e| fatal(e, |message| SweepError::branch_listing_failed(message)))?;

        let candidates: Vec<_> = branches
            .into_iter()
            .filter(|branch| branch.name != default_branch)
            .collect();
        info!(count = candidates.len(), "evaluating candidate branches");

        for branch in &candidates {
            let classification = self.evaluate(&branch.name, cutoff);
            self.report.record(&branch.name, classification);
        }

        info!(
            evaluated = self.report.total(),
            deleted = self.report.deleted.len(),
            skipped = self.report.skipped.len(),
            dry_run = self.policy.is_dry_run(),
            "branch sweep finished"
        );
        Ok(self.report)
    }

    fn evaluate(&self, name: &str, cutoff: DateTime<Utc>) -> Classification {
        if let Some(classification) = self.policy.classify_name(name) {
            match classification {
                Classification::Protected => info!(branch = %name, "protected, skipping"),
                _ => info!(branch = %name, "matches exclude pattern, skipping"),
            }
            return classification;
        }

        let last_commit = match self.source.last_commit_timestamp(name) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                warn!(branch = %name, error = %e, "error processing branch");
                return Classification::ProcessingError;
            }
        };

        info!(
            branch = %name,
            days_old = days_old(last_commit, Utc::now()),
            threshold = self.policy.days_old_threshold(),
            "last commit age"
        );

        match classify_age(last_commit, cutoff) {
            Classification::Deletable => self.delete(name),
            other => {
                debug!(branch = %name, "too recent, keeping");
                other
            }
        }
    }

    fn delete(&self, name: &str) -> Classification {
        if self.policy.is_dry_run() {
            info!(branch = %name, "would delete (dry run)");
            return Classification::Deletable;
        }

        match self.source.delete_branch(name) {
            Ok(()) => {
                info!(branch = %name, "deleted");
                Classification::Deletable
            }
            Err(e) => {
                warn!(branch = %name, error = %e, "failed to delete branch");
                Classification::DeletionFailed
            }
        }
    }
}

/// Keeps an already-fatal error as is; wraps anything else with `wrap`.
fn fatal(error: SweepError, wrap: fn(String) -> SweepError) -> SweepError {
    if error.is_fatal() {
        error
    } else {
        wrap(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::test_helpers::*;
    use chrono::Duration;

    fn retention(
        days: u32,
        protected: &[&str],
        pattern: Option<&str>,
        dry_run: bool,
    ) -> RetentionConfig {
        RetentionConfig {
            days_old_threshold: days,
            dry_run,
            protected_branches: protected.iter().map(|s| s.to_string()).collect(),
            exclude_pattern: pattern.map(str::to_string),
        }
    }

    fn scenario_source() -> FakeBranchSource {
        FakeBranchSource::new("main")
            .with_branch("main", days_ago(1))
            .with_branch("feature/a", days_ago(20))
            .with_branch("release/1.0", days_ago(5))
    }

    fn skipped(report: &RunReport) -> Vec<(&str, SkipReason)> {
        report
            .skipped
            .iter()
            .map(|s| (s.branch.as_str(), s.reason))
            .collect()
    }

    #[test]
    fn test_live_run_scenario() {
        let source = scenario_source();
        let report = RetentionEngine::new(&source, &retention(14, &["main"], None, false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["feature/a"]);
        assert_eq!(skipped(&report), vec![("release/1.0", SkipReason::TooRecent)]);
        assert_eq!(source.deletions(), vec!["feature/a"]);
        assert!(!source.has_branch("feature/a"));
    }

    #[test]
    fn test_dry_run_matches_live_lists_without_deleting() {
        let dry_source = scenario_source();
        let dry = RetentionEngine::new(&dry_source, &retention(14, &["main"], None, true))
            .run()
            .unwrap();

        let live_source = scenario_source();
        let live = RetentionEngine::new(&live_source, &retention(14, &["main"], None, false))
            .run()
            .unwrap();

        assert_eq!(dry.deleted, live.deleted);
        assert_eq!(dry.skipped, live.skipped);
        assert!(dry.dry_run);
        assert_eq!(dry_source.deletion_count(), 0);
        assert!(dry_source.has_branch("feature/a"));
    }

    #[test]
    fn test_dry_run_is_idempotent() {
        let source = scenario_source()
            .with_branch("hotfix/x", days_ago(40))
            .with_broken_branch("broken");
        let config = retention(14, &["main"], Some("^hotfix/"), true);

        let first = RetentionEngine::new(&source, &config).run().unwrap();
        let second = RetentionEngine::new(&source, &config).run().unwrap();

        assert_eq!(first, second);
        assert_eq!(source.deletion_count(), 0);
    }

    #[test]
    fn test_default_branch_is_never_a_candidate() {
        let source = FakeBranchSource::new("trunk")
            .with_branch("trunk", days_ago(400))
            .with_branch("feature/a", days_ago(20))
            .forbid_lookup("trunk");

        let report = RetentionEngine::new(&source, &retention(14, &[], None, false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["feature/a"]);
        assert!(report.skipped.is_empty());
        assert!(source.has_branch("trunk"));
    }

    #[test]
    fn test_protected_branches_are_never_looked_up() {
        let source = FakeBranchSource::new("main")
            .with_branch("develop", days_ago(100))
            .with_branch("staging", days_ago(100))
            .forbid_lookup("develop")
            .forbid_lookup("staging");

        let report = RetentionEngine::new(
            &source,
            &retention(14, &["develop", "staging"], None, false),
        )
        .run()
        .unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(
            skipped(&report),
            vec![
                ("develop", SkipReason::Protected),
                ("staging", SkipReason::Protected)
            ]
        );
        assert!(source.lookups().is_empty());
    }

    #[test]
    fn test_excluded_branches_skip_regardless_of_age() {
        let source = FakeBranchSource::new("main")
            .with_branch("release/old", days_ago(365))
            .with_branch("release/new", days_ago(1))
            .with_branch("feature/old", days_ago(365))
            .forbid_lookup("release/old")
            .forbid_lookup("release/new");

        let report = RetentionEngine::new(&source, &retention(14, &[], Some("^release/"), false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["feature/old"]);
        assert_eq!(
            skipped(&report),
            vec![
                ("release/old", SkipReason::MatchesExcludePattern),
                ("release/new", SkipReason::MatchesExcludePattern)
            ]
        );
    }

    #[test]
    fn test_invalid_exclude_pattern_degrades_to_no_exclusion() {
        let source = FakeBranchSource::new("main")
            .with_branch("release/(old", days_ago(30))
            .with_branch("release/new", days_ago(2));

        let report = RetentionEngine::new(&source, &retention(14, &[], Some("release/(old"), false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["release/(old"]);
        assert_eq!(report.count_by_reason(SkipReason::MatchesExcludePattern), 0);
        assert_eq!(skipped(&report), vec![("release/new", SkipReason::TooRecent)]);
    }

    #[test]
    fn test_age_boundaries_against_fixed_cutoff() {
        let started_at = Utc::now();
        let source = FakeBranchSource::new("main")
            .with_branch("fifteen", started_at - Duration::days(15))
            .with_branch("thirteen", started_at - Duration::days(13))
            .with_branch("exactly-fourteen", started_at - Duration::days(14));

        let report = RetentionEngine::new(&source, &retention(14, &[], None, true))
            .run_at(started_at)
            .unwrap();

        assert_eq!(report.deleted, vec!["fifteen"]);
        assert_eq!(
            skipped(&report),
            vec![
                ("thirteen", SkipReason::TooRecent),
                ("exactly-fourteen", SkipReason::TooRecent)
            ]
        );
    }

    #[test]
    fn test_deletion_failure_does_not_stop_the_run() {
        let source = FakeBranchSource::new("main")
            .with_branch("feature/a", days_ago(30))
            .with_branch("feature/locked", days_ago(30))
            .with_branch("feature/c", days_ago(30))
            .failing_delete("feature/locked");

        let report = RetentionEngine::new(&source, &retention(14, &[], None, false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["feature/a", "feature/c"]);
        assert_eq!(
            skipped(&report),
            vec![("feature/locked", SkipReason::DeletionFailed)]
        );
        assert_eq!(source.deletion_count(), 3);
        assert!(source.has_branch("feature/locked"));
    }

    #[test]
    fn test_lookup_failure_is_isolated() {
        let source = FakeBranchSource::new("main")
            .with_broken_branch("feature/broken")
            .with_branch("feature/old", days_ago(30));

        let report = RetentionEngine::new(&source, &retention(14, &[], None, false))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["feature/old"]);
        assert_eq!(
            skipped(&report),
            vec![("feature/broken", SkipReason::ErrorProcessing)]
        );
    }

    #[test]
    fn test_every_candidate_lands_in_exactly_one_list() {
        let source = FakeBranchSource::new("main")
            .with_branch("main", days_ago(90))
            .with_branch("develop", days_ago(90))
            .with_branch("keep/this", days_ago(90))
            .with_branch("feature/new", days_ago(1))
            .with_branch("feature/old", days_ago(90))
            .with_branch("feature/locked", days_ago(90))
            .with_broken_branch("feature/broken")
            .failing_delete("feature/locked");

        let report = RetentionEngine::new(&source, &retention(14, &["develop"], Some("^keep/"), false))
            .run()
            .unwrap();

        let mut seen: Vec<&str> = report.deleted.iter().map(String::as_str).collect();
        seen.extend(report.skipped.iter().map(|s| s.branch.as_str()));
        assert_eq!(
            seen,
            vec![
                "feature/old",
                "develop",
                "keep/this",
                "feature/new",
                "feature/locked",
                "feature/broken"
            ]
        );
        assert!(!seen.contains(&"main"));
    }

    #[test]
    fn test_listing_order_is_preserved() {
        let source = FakeBranchSource::new("main")
            .with_branch("zeta", days_ago(30))
            .with_branch("alpha", days_ago(30))
            .with_branch("mid", days_ago(30));

        let report = RetentionEngine::new(&source, &retention(14, &[], None, true))
            .run()
            .unwrap();

        assert_eq!(report.deleted, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_default_branch_failure_is_fatal() {
        let source = FakeBranchSource::unreachable_default_branch()
            .with_branch("feature/a", days_ago(30));

        let err = RetentionEngine::new(&source, &retention(14, &[], None, false))
            .run()
            .unwrap_err();

        assert!(matches!(err, SweepError::DefaultBranchUnavailable { .. }));
        assert_eq!(source.deletion_count(), 0);
    }

    #[test]
    fn test_listing_failure_is_fatal_and_reports_nothing() {
        let source = FakeBranchSource::new("main").failing_listing();
        let mut reporter = RecordingReporter::default();

        let err = RetentionEngine::new(&source, &retention(14, &[], None, false))
            .execute(&mut reporter)
            .unwrap_err();

        assert!(matches!(err, SweepError::BranchListingFailed { .. }));
        assert!(reporter.reports.is_empty());
    }

    #[test]
    fn test_execute_emits_report_once() {
        let source = scenario_source();
        let mut reporter = RecordingReporter::default();

        let report = RetentionEngine::new(&source, &retention(14, &["main"], None, false))
            .execute(&mut reporter)
            .unwrap();

        assert_eq!(reporter.reports, vec![report]);
    }

    #[test]
    fn test_from_loader_uses_loaded_retention() {
        let mut config = Config::default();
        config.retention.days_old_threshold = 60;
        config.retention.exclude_pattern = Some("^wip/".to_string());

        let source = scenario_source();
        let engine = RetentionEngine::from_loader(&source, &config).unwrap();

        assert_eq!(engine.policy().days_old_threshold(), 60);
        assert!(engine.policy().is_excluded("wip/thing"));
        assert!(engine.policy().is_protected("production"));
    }

    #[test]
    fn test_fresh_engine_per_run_does_not_leak_protection() {
        let first = FakeBranchSource::new("trunk").with_branch("feature/a", days_ago(30));
        let second = FakeBranchSource::new("main")
            .with_branch("trunk", days_ago(30))
            .with_branch("main", days_ago(30));
        let config = retention(14, &[], None, true);

        RetentionEngine::new(&first, &config).run().unwrap();
        let report = RetentionEngine::new(&second, &config).run().unwrap();

        assert_eq!(report.deleted, vec!["trunk"]);
    }
}
