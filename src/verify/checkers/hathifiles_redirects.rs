//! Monthly catalog record redirect files and their history

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifacts::Location;
use crate::verify::engine::{Checker, Services};
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::{open_content, record_unreadable_line, verify_file};

pub const HISTORY_FILE_KEYS: [&str; 4] = ["recid", "mrs", "entries", "json_class"];

pub struct HathifilesRedirects {
    redirect_line: Regex,
}

impl HathifilesRedirects {
    pub fn new() -> Result<Self> {
        Ok(Self {
            redirect_line: Regex::new(r"^[0-9]{9}\t[0-9]{9}$")?,
        })
    }

    pub fn redirects_file(services: &Services, date: NaiveDate) -> Result<PathBuf> {
        let name = format!("redirects_{}.txt.gz", date.format("%Y%m"));
        Ok(services.locator.location_path(Location::RedirectsDir, &name)?)
    }

    pub fn redirects_history_file(services: &Services, date: NaiveDate) -> Result<PathBuf> {
        let name = format!("{}.ndj.gz", date.format("%Y%m"));
        Ok(services
            .locator
            .location_path(Location::RedirectsHistoryDir, &name)?)
    }

    fn verify_redirects_file(&self, path: &Path, log: &mut ErrorLog) {
        self.each_line(path, log, |line| self.redirect_line.is_match(line))
    }

    fn verify_redirects_history_file(&self, path: &Path, log: &mut ErrorLog) {
        self.each_line(path, log, is_history_entry)
    }

    fn each_line<F>(&self, path: &Path, log: &mut ErrorLog, well_formed: F)
    where
        F: Fn(&str) -> bool,
    {
        if !verify_file(log, path) {
            return;
        }
        info!(path = %path.display(), "verifying contents");
        let Some(lines) = open_content(log, path) else {
            return;
        };
        for (idx, line) in lines.enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    record_unreadable_line(log, path, idx + 1, e);
                    return;
                }
            };
            if !well_formed(&line) {
                log.record(
                    FindingKind::StructuralViolation,
                    format!("{}:{} contains malformed line: {line}", path.display(), idx + 1),
                );
            }
        }
    }
}

/// A JSON object carrying every history key
fn is_history_entry(line: &str) -> bool {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => HISTORY_FILE_KEYS.iter().all(|key| map.contains_key(*key)),
        _ => false,
    }
}

impl Checker for HathifilesRedirects {
    fn name(&self) -> &'static str {
        "HathifilesRedirects"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        self.verify_redirects_file(&Self::redirects_file(services, date)?, log);
        self.verify_redirects_history_file(&Self::redirects_history_file(services, date)?, log);
        Ok(())
    }
}
