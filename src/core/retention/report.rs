use super::policy::Classification;
use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason codes consumed downstream; the serialized spellings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Protected,
    MatchesExcludePattern,
    TooRecent,
    DeletionFailed,
    ErrorProcessing,
}

impl SkipReason {
    pub const ALL: [SkipReason; 5] = [
        SkipReason::Protected,
        SkipReason::MatchesExcludePattern,
        SkipReason::TooRecent,
        SkipReason::DeletionFailed,
        SkipReason::ErrorProcessing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Protected => "protected",
            SkipReason::MatchesExcludePattern => "matches_exclude_pattern",
            SkipReason::TooRecent => "too_recent",
            SkipReason::DeletionFailed => "deletion_failed",
            SkipReason::ErrorProcessing => "error_processing",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBranch {
    pub branch: String,
    pub reason: SkipReason,
}

/// Outcome of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub deleted: Vec<String>,
    pub skipped: Vec<SkippedBranch>,
    /// Not part of the serialized report: a dry run's lists are identical to a
    /// live run's, only the side effects differ.
    #[serde(skip)]
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record(&mut self, branch: &str, classification: Classification) {
        match classification.skip_reason() {
            Some(reason) => self.skipped.push(SkippedBranch {
                branch: branch.to_string(),
                reason,
            }),
            None => self.deleted.push(branch.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.skipped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.skipped.len()
    }

    pub fn count_by_reason(&self, reason: SkipReason) -> usize {
        self.skipped
            .iter()
            .filter(|skipped| skipped.reason == reason)
            .count()
    }

    pub fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &str> {
        self.skipped
            .iter()
            .filter(move |skipped| skipped.reason == reason)
            .map(|skipped| skipped.branch.as_str())
    }

    pub fn has_failures(&self) -> bool {
        self.count_by_reason(SkipReason::DeletionFailed) > 0
            || self.count_by_reason(SkipReason::ErrorProcessing) > 0
    }
}

/// Receives the finished report of a run.
pub trait Reporter {
    fn report(&mut self, report: &RunReport) -> Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, report: &RunReport) -> Result<()> {
        (**self).report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> RunReport {
        let mut report = RunReport::new(false);
        report.record("feature/a", Classification::Deletable);
        report.record("release/1.0", Classification::TooRecent);
        report.record("develop", Classification::Protected);
        report.record("feature/locked", Classification::DeletionFailed);
        report
    }

    #[test]
    fn test_record_routes_by_classification() {
        let report = sample_report();
        assert_eq!(report.deleted, vec!["feature/a"]);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.skipped[0].branch, "release/1.0");
        assert_eq!(report.skipped[0].reason, SkipReason::TooRecent);
        assert_eq!(report.total(), 4);
        assert!(report.has_failures());
    }

    #[test]
    fn test_reason_codes_serialize_exactly() {
        for reason in SkipReason::ALL {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, json!(reason.as_str()));
            assert_eq!(reason.to_string(), reason.as_str());
        }
    }

    #[test]
    fn test_report_json_shape() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(
            value,
            json!({
                "deleted": ["feature/a"],
                "skipped": [
                    { "branch": "release/1.0", "reason": "too_recent" },
                    { "branch": "develop", "reason": "protected" },
                    { "branch": "feature/locked", "reason": "deletion_failed" }
                ]
            })
        );
    }

    #[test]
    fn test_skipped_with_filters_in_order() {
        let mut report = RunReport::default();
        report.record("a", Classification::TooRecent);
        report.record("b", Classification::Protected);
        report.record("c", Classification::TooRecent);

        let too_recent: Vec<&str> = report.skipped_with(SkipReason::TooRecent).collect();
        assert_eq!(too_recent, vec!["a", "c"]);
        assert_eq!(report.count_by_reason(SkipReason::Protected), 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::new(true);
        assert!(report.is_empty());
        assert!(report.dry_run);
    }
}
