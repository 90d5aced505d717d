use super::report::SkipReason;
use crate::config::RetentionConfig;
use chrono::{DateTime, Days, Utc};
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Why a branch ended up where it did in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Protected,
    Excluded,
    TooRecent,
    Deletable,
    DeletionFailed,
    ProcessingError,
}

impl Classification {
    /// `None` for `Deletable`: those branches land in the deleted list.
    pub fn skip_reason(self) -> Option<SkipReason> {
        match self {
            Classification::Protected => Some(SkipReason::Protected),
            Classification::Excluded => Some(SkipReason::MatchesExcludePattern),
            Classification::TooRecent => Some(SkipReason::TooRecent),
            Classification::DeletionFailed => Some(SkipReason::DeletionFailed),
            Classification::ProcessingError => Some(SkipReason::ErrorProcessing),
            Classification::Deletable => None,
        }
    }
}

/// The per-run rules: which names are off limits and how old is too old.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    protected: HashSet<String>,
    exclude: Option<Regex>,
    days_old_threshold: u32,
    dry_run: bool,
}

impl RetentionPolicy {
    pub fn from_config(config: &RetentionConfig) -> Self {
        let exclude = config
            .exclude_pattern
            .as_deref()
            .and_then(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(
                        pattern,
                        error = %e,
                        "invalid exclude pattern, no branch will be excluded by pattern"
                    );
                    None
                }
            });

        Self {
            protected: config.protected_branches.iter().cloned().collect(),
            exclude,
            days_old_threshold: config.days_old_threshold,
            dry_run: config.dry_run,
        }
    }

    /// Returns true if the name was not already protected.
    pub fn protect(&mut self, name: &str) -> bool {
        self.protected.insert(name.to_string())
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|regex| regex.is_match(name))
    }

    pub fn has_exclude_pattern(&self) -> bool {
        self.exclude.is_some()
    }

    pub fn days_old_threshold(&self) -> u32 {
        self.days_old_threshold
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Classifies by name alone. `None` means the commit date is needed.
    pub fn classify_name(&self, name: &str) -> Option<Classification> {
        if self.is_protected(name) {
            Some(Classification::Protected)
        } else if self.is_excluded(name) {
            Some(Classification::Excluded)
        } else {
            None
        }
    }

    pub fn cutoff(&self, started_at: DateTime<Utc>) -> DateTime<Utc> {
        cutoff(started_at, self.days_old_threshold)
    }
}

/// `started_at` minus `days` calendar days.
pub fn cutoff(started_at: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    started_at
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Strictly older than the cutoff is deletable; exactly at the cutoff is not.
pub fn classify_age(last_commit: DateTime<Utc>, cutoff: DateTime<Utc>) -> Classification {
    if last_commit < cutoff {
        Classification::Deletable
    } else {
        Classification::TooRecent
    }
}

/// Whole days since `last_commit`, rounded up. Display only; decisions use
/// [`classify_age`] against the run's fixed cutoff.
pub fn days_old(last_commit: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - last_commit).num_milliseconds() as f64;
    (elapsed / MILLIS_PER_DAY).ceil() as i64
}
