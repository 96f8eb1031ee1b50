//! Every HTID in the day's rights files must have reached `rights_current`

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::artifacts::{catalog, Artifact};
use crate::external::Database;
use crate::verify::engine::{Checker, Services};
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::{open_content, record_unreadable_line, verify_file};

pub const DEFAULT_SLICE_SIZE: usize = 10_000;

pub struct PopulateRights {
    slice_size: usize,
}

impl Default for PopulateRights {
    fn default() -> Self {
        Self::new(DEFAULT_SLICE_SIZE)
    }
}

impl PopulateRights {
    pub fn new(slice_size: usize) -> Self {
        Self {
            slice_size: slice_size.max(1),
        }
    }

    fn verify_rights_file(&self, db: &dyn Database, path: &Path, log: &mut ErrorLog) -> Result<()> {
        info!(path = %path.display(), "checking rights_current");
        let Some(lines) = open_content(log, path) else {
            return Ok(());
        };
        let mut slice = BTreeSet::new();
        for (idx, line) in lines.enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    // HTIDs read before the break are still checked
                    record_unreadable_line(log, path, idx + 1, e);
                    break;
                }
            };
            let Some(htid) = line.trim().split('\t').next().filter(|id| !id.is_empty()) else {
                continue;
            };
            slice.insert(htid.to_string());
            if slice.len() >= self.slice_size {
                find_missing_rights(db, &slice, log)?;
                slice.clear();
            }
        }
        if !slice.is_empty() {
            find_missing_rights(db, &slice, log)?;
        }
        Ok(())
    }
}

fn find_missing_rights(db: &dyn Database, htids: &BTreeSet<String>, log: &mut ErrorLog) -> Result<()> {
    let split: Vec<(String, String)> = htids
        .iter()
        .map(|htid| match htid.split_once('.') {
            Some((namespace, id)) => (namespace.to_string(), id.to_string()),
            None => (htid.clone(), String::new()),
        })
        .collect();
    let present = db.rights_present(&split)?;
    for htid in htids.iter().filter(|htid| !present.contains(*htid)) {
        log.record(
            FindingKind::ExternalInconsistency,
            format!("missing rights_current for {htid}"),
        );
    }
    Ok(())
}

impl Checker for PopulateRights {
    fn name(&self) -> &'static str {
        "PopulateRights"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::rights, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            if !verify_file(log, &path) {
                continue;
            }
            self.verify_rights_file(services.database()?, &path, log)?;
        }
        Ok(())
    }
}
