use crate::core::retention::{Reporter, RunReport, SkipReason};
use crate::utils::Result;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Human-readable summary.
pub struct TextReporter<W: Write> {
    out: W,
}

impl TextReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_summary(&mut self, report: &RunReport) -> io::Result<()> {
        let title = if report.dry_run {
            "🧹 Branch Sweep Complete (dry run)"
        } else {
            "🧹 Branch Sweep Complete"
        };
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}\n", "=".repeat(title.chars().count()))?;

        if report.is_empty() {
            writeln!(self.out, "✨ No branches to evaluate besides the default branch")?;
            return Ok(());
        }

        self.write_deleted(report)?;
        self.write_skipped(report)?;
        self.write_failures(report)?;

        if report.deleted.is_empty() {
            writeln!(self.out, "\n✨ Nothing was old enough to delete")?;
        }
        Ok(())
    }

    fn write_deleted(&mut self, report: &RunReport) -> io::Result<()> {
        if report.deleted.is_empty() {
            return Ok(());
        }
        let verb = if report.dry_run { "Would delete" } else { "Deleted" };
        writeln!(
            self.out,
            "  ✅ {} {} {}",
            verb,
            report.deleted.len(),
            plural(report.deleted.len())
        )?;
        for branch in &report.deleted {
            writeln!(self.out, "     • {}", branch)?;
        }
        Ok(())
    }

    fn write_skipped(&mut self, report: &RunReport) -> io::Result<()> {
        for reason in SkipReason::ALL {
            let Some(label) = kept_label(reason) else {
                continue;
            };
            let count = report.count_by_reason(reason);
            if count > 0 {
                writeln!(self.out, "  ⏭️  Kept {} {} {}", count, plural(count), label)?;
            }
        }
        Ok(())
    }

    fn write_failures(&mut self, report: &RunReport) -> io::Result<()> {
        if !report.has_failures() {
            return Ok(());
        }
        writeln!(self.out, "\n⚠️  Some branches couldn't be processed:")?;
        for branch in report.skipped_with(SkipReason::DeletionFailed) {
            writeln!(self.out, "  • {}: deletion failed", branch)?;
        }
        for branch in report.skipped_with(SkipReason::ErrorProcessing) {
            writeln!(self.out, "  • {}: could not read last commit", branch)?;
        }
        Ok(())
    }
}

/// Failures are listed separately, so they have no "kept" label.
fn kept_label(reason: SkipReason) -> Option<&'static str> {
    match reason {
        SkipReason::Protected => Some("protected"),
        SkipReason::MatchesExcludePattern => Some("matching the exclude pattern"),
        SkipReason::TooRecent => Some("too recent"),
        SkipReason::DeletionFailed | SkipReason::ErrorProcessing => None,
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, report: &RunReport) -> Result<()> {
        self.write_summary(report)?;
        self.out.flush()?;
        Ok(())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "branch"
    } else {
        "branches"
    }
}

/// The report as a single JSON document.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, report: &RunReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Appends `deleted_branches` and `skipped_branches` as JSON to a GitHub
/// Actions output file.
pub struct GithubOutputReporter {
    path: PathBuf,
}

impl GithubOutputReporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Reporter for GithubOutputReporter {
    fn report(&mut self, report: &RunReport) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "deleted_branches={}",
            serde_json::to_string(&report.deleted)?
        )?;
        writeln!(
            file,
            "skipped_branches={}",
            serde_json::to_string(&report.skipped)?
        )?;
        Ok(())
    }
}

/// Fans one report out to several sinks, stopping at the first failure.
#[derive(Default)]
pub struct ReporterSet {
    reporters: Vec<Box<dyn Reporter>>,
}

impl ReporterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl Reporter for ReporterSet {
    fn report(&mut self, report: &RunReport) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.report(report)?;
        }
        Ok(())
    }
}
