//! Runs every registered checker for every journal date
//!
//! Each checker call is isolated: a returned error or a panic is logged as
//! fatal, recorded in that checker's log, and the next checker runs anyway.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info};

use super::checkers::default_checkers;
use super::findings::{ErrorLog, FindingKind};
use crate::artifacts::ArtifactLocator;
use crate::external::{Database, SearchIndex};
use crate::journal::Journal;

/// Collaborators handed to every checker
pub struct Services {
    pub locator: ArtifactLocator,
    pub database: Option<Box<dyn Database>>,
    pub search: Option<Box<dyn SearchIndex>>,
}

impl Services {
    pub fn new(locator: ArtifactLocator) -> Self {
        Self {
            locator,
            database: None,
            search: None,
        }
    }

    pub fn with_database(mut self, database: Box<dyn Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_search(mut self, search: Box<dyn SearchIndex>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn database(&self) -> Result<&dyn Database> {
        self.database
            .as_deref()
            .ok_or_else(|| anyhow!("No database configured (set DATABASE_PATH)"))
    }

    pub fn search(&self) -> Result<&dyn SearchIndex> {
        self.search
            .as_deref()
            .ok_or_else(|| anyhow!("No search index configured (set SOLR_URL)"))
    }
}

/// One pipeline stage's verification
///
/// Soft failures go to `log`; an `Err` means the checker could not finish.
pub trait Checker {
    fn name(&self) -> &'static str;

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog)
        -> Result<()>;
}

struct Entry {
    checker: Box<dyn Checker>,
    log: ErrorLog,
}

pub struct VerificationEngine {
    services: Services,
    entries: Vec<Entry>,
}

impl VerificationEngine {
    /// An engine with no checkers registered
    pub fn new(services: Services) -> Self {
        Self {
            services,
            entries: Vec::new(),
        }
    }

    /// An engine with every pipeline checker, in pipeline order
    pub fn with_default_checkers(services: Services) -> Result<Self> {
        let mut engine = Self::new(services);
        for checker in default_checkers()? {
            engine.register(checker);
        }
        Ok(engine)
    }

    pub fn register(&mut self, checker: Box<dyn Checker>) {
        let log = ErrorLog::new(checker.name());
        self.entries.push(Entry { checker, log });
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Verify every date in `journal`, oldest first
    pub fn run(&mut self, journal: &Journal) {
        for date in journal.dates() {
            self.run_for_date(*date);
        }
    }

    pub fn run_for_date(&mut self, date: NaiveDate) {
        for entry in &mut self.entries {
            let name = entry.checker.name();
            info!(checker = name, %date, "running");

            let checker = &mut entry.checker;
            let log = &mut entry.log;
            let services = &self.services;
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                checker.run_for_date(services, date, log)
            }));

            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => format!("{e:#}"),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            error!(fatal = true, checker = name, %date, "{failure}");
            entry.log.record(
                FindingKind::CheckerFailure,
                format!("failed for {date}: {failure}"),
            );
        }
    }

    /// Each checker's name and log, in registration order
    pub fn report(&self) -> Vec<(&'static str, &ErrorLog)> {
        self.entries
            .iter()
            .map(|entry| (entry.checker.name(), &entry.log))
            .collect()
    }

    pub fn total_errors(&self) -> usize {
        self.entries.iter().map(|entry| entry.log.len()).sum()
    }

    /// All findings as `Checker: message`, in registration order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.log.messages())
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
