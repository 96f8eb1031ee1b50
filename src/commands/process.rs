//! Run the Zephir pipeline scripts for every export date not yet processed

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::dates::compact;
use crate::inventory::MissingDateFinder;
use crate::journal::Journal;
use crate::process::{self, ProcessRunner, ScriptKind, Scripts};

/// Execute the process command
pub fn execute(config: &Config, dry_run: bool) -> Result<()> {
    let yesterday = Local::now()
        .date_naive()
        .pred_opt()
        .context("Cannot compute yesterday's date")?;
    execute_for(config, yesterday, dry_run)
}

/// Process export dates up to and including `last`
pub fn execute_for(config: &Config, last: NaiveDate, dry_run: bool) -> Result<()> {
    let locator = config.locator();
    let earliest = MissingDateFinder::new(&locator)
        .earliest_missing_date(last)
        .context("Failed to inventory Zephir outputs")?;

    let steps = process::plan(earliest, last);
    let Some(first) = steps.first() else {
        println!("{} No Zephir files to process", "✓".green().bold());
        return Ok(());
    };
    info!(from = %first.datestamp, to = %last, steps = steps.len(), "processing Zephir files");

    let scripts = Scripts {
        full: config.process.script_path(&config.process.full_script),
        incremental: config.process.script_path(&config.process.incremental_script),
    };

    if dry_run {
        println!("{} Would run:", "→".cyan().bold());
        for step in &steps {
            let script = match step.script {
                ScriptKind::Full => &scripts.full,
                ScriptKind::Incremental => &scripts.incremental,
            };
            println!("  {} {}", script.display(), compact(step.datestamp));
        }
        return Ok(());
    }

    let runner = ProcessRunner::new(config.process.timeout());
    let report = process::execute(&steps, &scripts, &runner)?;

    let journal_path = Journal::destination_path(&config.data_root());
    Journal::new(report.run_dates.iter().copied())
        .write(&journal_path)
        .with_context(|| format!("Failed to write journal: {}", journal_path.display()))?;
    info!(path = %journal_path.display(), dates = report.run_dates.len(), "journal written");

    for result in &report.results {
        println!("  {} {}", "✓".green().bold(), result.summary());
    }
    if let Some(failed) = &report.failed {
        println!("  {} {}", "✗".red().bold(), failed.summary());
        if !failed.stderr.trim().is_empty() {
            println!("{}", failed.stderr.trim().dimmed());
        }
    }
    report.ensure_success()
}
