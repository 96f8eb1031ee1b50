//! Hathifiles loaded into the database: `hf_log` entries and `hf` row counts

use anyhow::Result;
use chrono::NaiveDate;

use crate::artifacts::{catalog, Artifact};
use crate::verify::engine::{Checker, Services};
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::gzip_line_count;

#[derive(Default)]
pub struct HathifilesDatabase;

impl Checker for HathifilesDatabase {
    fn name(&self) -> &'static str {
        "HathifilesDatabase"
    }

    /// Missing hathifiles are reported by the contents checker and skipped here
    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::hathifile, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            if !path.exists() {
                continue;
            }
            let db = services.database()?;

            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if !db.log_entry_exists(filename)? {
                log.record(
                    FindingKind::ExternalInconsistency,
                    format!("missing hf_log: no entry for {}", path.display()),
                );
            }

            if kind.is_full() {
                let Some(file_count) = gzip_line_count(log, &path) else {
                    continue;
                };
                let file_count = file_count as u64;
                let db_count = db.table_count("hf")?;
                if file_count > db_count {
                    log.record(
                        FindingKind::ExternalInconsistency,
                        format!(
                            "hf count mismatch: {} ({file_count}) vs hathifiles.hf ({db_count})",
                            path.display()
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}
