//! Production trigger: reprocess every export date from the earliest gap
//!
//! Dates here are Zephir export datestamps. The journal written at the end
//! holds run dates, one day later, which is what verification consumes.

pub mod runner;

pub use runner::{ProcessRunner, ScriptResult, ScriptRunner};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{error, info};

use crate::dates::{compact, is_cycle_boundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Full,
    Incremental,
}

/// One script invocation for one export date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub datestamp: NaiveDate,
    pub script: ScriptKind,
}

/// Script invocations covering `earliest..=last`, full before incremental
pub fn plan(earliest: Option<NaiveDate>, last: NaiveDate) -> Vec<Step> {
    let Some(earliest) = earliest else {
        return Vec::new();
    };
    earliest
        .iter_days()
        .take_while(|date| *date <= last)
        .flat_map(|datestamp| {
            let full = is_cycle_boundary(datestamp).then_some(Step {
                datestamp,
                script: ScriptKind::Full,
            });
            full.into_iter().chain(std::iter::once(Step {
                datestamp,
                script: ScriptKind::Incremental,
            }))
        })
        .collect()
}

/// Run date whose verification covers the export `datestamp`
pub fn run_date_for(datestamp: NaiveDate) -> NaiveDate {
    datestamp.succ_opt().unwrap_or(datestamp)
}

#[derive(Debug, Clone)]
pub struct Scripts {
    pub full: PathBuf,
    pub incremental: PathBuf,
}

impl Scripts {
    fn path(&self, kind: ScriptKind) -> &PathBuf {
        match kind {
            ScriptKind::Full => &self.full,
            ScriptKind::Incremental => &self.incremental,
        }
    }
}

/// Outcome of running a plan
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Run dates whose every step succeeded, ascending
    pub run_dates: Vec<NaiveDate>,
    pub results: Vec<ScriptResult>,
    pub failed: Option<ScriptResult>,
}

/// Run `steps` in order, stopping at the first failed script
///
/// A date counts as processed once all of its steps succeed.
pub fn execute(steps: &[Step], scripts: &Scripts, runner: &dyn ScriptRunner) -> Result<ProcessReport> {
    if steps.is_empty() {
        info!("no Zephir files to process");
        return Ok(ProcessReport::default());
    }

    let mut report = ProcessReport::default();
    for (idx, step) in steps.iter().enumerate() {
        let result = runner.run(scripts.path(step.script), &compact(step.datestamp))?;
        if !result.success {
            error!(datestamp = %step.datestamp, "{}", result.summary());
            report.failed = Some(result);
            return Ok(report);
        }
        info!("{}", result.summary());
        report.results.push(result);

        let last_for_date = steps
            .get(idx + 1)
            .map_or(true, |next| next.datestamp != step.datestamp);
        if last_for_date {
            report.run_dates.push(run_date_for(step.datestamp));
        }
    }
    Ok(report)
}

impl ProcessReport {
    /// Error out when a script failed
    pub fn ensure_success(&self) -> Result<()> {
        if let Some(failed) = &self.failed {
            bail!("Pipeline script failed: {}", failed.summary());
        }
        Ok(())
    }
}
