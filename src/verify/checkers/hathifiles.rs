//! Hathifile contents, and coverage of the catalog records they derive from

use anyhow::Result;
use chrono::NaiveDate;

use crate::artifacts::{catalog, Artifact};
use crate::verify::engine::{Checker, Services};
use crate::verify::fields::FieldValidator;
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::{gzip_line_count, validate_lines, verify_file};

pub struct Hathifiles {
    validator: FieldValidator,
}

impl Hathifiles {
    pub fn new() -> Result<Self> {
        Ok(Self {
            validator: FieldValidator::hathifile()?,
        })
    }
}

impl Checker for Hathifiles {
    fn name(&self) -> &'static str {
        "Hathifiles"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::hathifile, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            if !verify_file(log, &path) {
                continue;
            }
            let Some(hathifile_count) = validate_lines(log, &path, &self.validator) else {
                continue;
            };

            // Built from the catalog archive of the same run
            let source = catalog::catalog_archive(kind.fullness);
            let catalog_path = Artifact::for_run_date(&source, date).path(&services.locator)?;
            if !verify_file(log, &catalog_path) {
                continue;
            }
            let Some(catalog_count) = gzip_line_count(log, &catalog_path) else {
                continue;
            };
            if hathifile_count < catalog_count {
                log.record(
                    FindingKind::CountMismatch,
                    format!(
                        "{} has {catalog_count} records but corresponding hathifile {} only has {hathifile_count}",
                        catalog_path.display(),
                        path.display()
                    ),
                );
            }
        }
        Ok(())
    }
}
