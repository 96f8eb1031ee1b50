//! Verify pipeline outputs for one date or for the journal of the last run
//!
//! Findings are printed and logged, but never change the exit status:
//! the log stream is the signal downstream alerting consumes.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use tracing::{info, warn};

use crate::config::Config;
use crate::dates::parse_date;
use crate::external::{SolrIndex, SqliteDatabase};
use crate::journal::Journal;
use crate::verify::{Services, VerificationEngine};

/// Which dates to verify
#[derive(Debug, Clone)]
pub enum Target {
    Date(NaiveDate),
    Journal,
}

impl Target {
    /// `--journal` verifies what the last process run journaled; otherwise
    /// the given date, or today when none is given
    pub fn from_args(date: Option<&str>, journal: bool) -> Result<Self> {
        if journal {
            return Ok(Target::Journal);
        }
        match date {
            Some(text) => Ok(Target::Date(parse_date(text)?)),
            None => Ok(Target::Date(Local::now().date_naive())),
        }
    }
}

/// Wire up the database and search index the config names
pub fn build_services(config: &Config) -> Result<Services> {
    let mut services = Services::new(config.locator());

    match &config.database.path {
        Some(path) => {
            let db = SqliteDatabase::open_readonly(path, config.database.busy_timeout())?;
            services = services.with_database(Box::new(db));
        }
        None => warn!("no database configured, database checks will fail"),
    }

    match &config.search.url {
        Some(url) => {
            let index = SolrIndex::new(
                url,
                config.search.connect_timeout(),
                config.search.request_timeout(),
            )?;
            services = services.with_search(Box::new(index));
        }
        None => warn!("no search index configured, index checks will fail"),
    }

    Ok(services)
}

/// Execute the verify command
pub fn execute(config: &Config, target: Target) -> Result<()> {
    let services = build_services(config)?;
    let mut engine = VerificationEngine::with_default_checkers(services)?;

    match target {
        Target::Date(date) => {
            println!("{} Verifying outputs for {date}...", "→".cyan().bold());
            engine.run_for_date(date);
        }
        Target::Journal => {
            let path = Journal::destination_path(&config.data_root());
            let journal = Journal::load(&path)
                .with_context(|| format!("Failed to load journal: {}", path.display()))?;
            println!(
                "{} Verifying {} journal date(s) from {}...",
                "→".cyan().bold(),
                journal.dates().len(),
                path.display()
            );
            engine.run(&journal);
        }
    }

    print_report(&engine);
    info!(total_errors = engine.total_errors(), "verification finished");
    Ok(())
}

fn print_report(engine: &VerificationEngine) {
    println!();
    for (name, log) in engine.report() {
        if log.is_empty() {
            println!("  {} {name}", "✓".green().bold());
        } else {
            println!(
                "  {} {name} ({} finding{})",
                "✗".red().bold(),
                log.len(),
                if log.len() == 1 { "" } else { "s" }
            );
            for finding in log.findings() {
                println!("      {} {}", format!("[{}]", finding.kind.as_str()).dimmed(), finding.message);
            }
        }
    }

    println!();
    let total = engine.total_errors();
    if total == 0 {
        println!("{} No problems found", "✓".green().bold());
    } else {
        println!("{} {total} problem(s) found", "!".yellow().bold());
    }
}
