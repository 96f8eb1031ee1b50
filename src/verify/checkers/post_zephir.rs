//! Outputs of the post-Zephir stage: catalog archive and prep files, deletes,
//! dollar-dup, ingest bibrecords and rights files

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use tracing::info;

use crate::artifacts::catalog::{self, INGEST_BIBRECORD_FILES, SUPPRESSION_REPORT};
use crate::artifacts::{Artifact, ArtifactKind, Location};
use crate::verify::engine::{Checker, Services};
use crate::verify::fields::FieldValidator;
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::{
    count_cross_check, gzip_line_count, open_content, record_unreadable_line, validate_lines,
    verify_file, verify_parseable_ndj, Counted,
};

pub struct PostZephir {
    rights_validator: FieldValidator,
    deleted_id: Regex,
    suppressed_line: Regex,
}

impl PostZephir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rights_validator: FieldValidator::rights()?,
            deleted_id: Regex::new(r"^[0-9]{9}$")?,
            suppressed_line: Regex::new(r"no.unsuppressed.*not.written")?,
        })
    }

    /// Archived catalog records must match the bib export minus suppressed records
    fn verify_catalog_archive(
        &self,
        services: &Services,
        date: NaiveDate,
        log: &mut ErrorLog,
    ) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::catalog_archive, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            if !verify_file(log, &path) {
                continue;
            }
            if verify_parseable_ndj(log, &path).is_none() {
                continue;
            }
            let Some(archive_count) = gzip_line_count(log, &path) else {
                continue;
            };

            let export = catalog::ht_bib_export(kind.fullness);
            let export_path = Artifact::for_run_date(&export, date).path(&services.locator)?;
            if !verify_file(log, &export_path) {
                continue;
            }
            let Some(export_count) = gzip_line_count(log, &export_path) else {
                continue;
            };

            let suppressed = if kind.is_full() {
                match self.count_suppressed_records(services, log)? {
                    Some(count) => count,
                    None => continue,
                }
            } else {
                0
            };
            count_cross_check(
                log,
                Counted {
                    path: &path,
                    count: archive_count,
                },
                suppressed,
                Counted {
                    path: &export_path,
                    count: export_count,
                },
            );
        }
        Ok(())
    }

    /// Records the monthly report says were left out of the full catalog
    ///
    /// Zero when the report is absent, `None` when it cannot be read.
    fn count_suppressed_records(&self, services: &Services, log: &mut ErrorLog) -> Result<Option<usize>> {
        let report = services
            .locator
            .location_path(Location::ZephirData, SUPPRESSION_REPORT)?;
        if !report.exists() {
            info!(path = %report.display(), "no suppression report, assuming none suppressed");
            return Ok(Some(0));
        }

        let Some(lines) = open_content(log, &report) else {
            return Ok(None);
        };
        let mut count = 0;
        for (idx, line) in lines.enumerate() {
            match line {
                Ok(line) if self.suppressed_line.is_match(&line) => count += 1,
                Ok(_) => {}
                Err(e) => {
                    record_unreadable_line(log, &report, idx + 1, e);
                    return Ok(None);
                }
            }
        }
        Ok(Some(count))
    }

    fn verify_catalog_prep(&self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        let deletes = Artifact::for_run_date(&catalog::catalog_deletes(), date).path(&services.locator)?;
        if verify_file(log, &deletes) {
            self.verify_deletes_contents(&deletes, log);
        }

        for kind in catalog::kinds_for_run_date(catalog::catalog_prep, date) {
            verify_file(log, &Artifact::for_run_date(&kind, date).path(&services.locator)?);
        }
        Ok(())
    }

    /// Deletes files hold 9-digit catalog record ids or blank lines
    fn verify_deletes_contents(&self, path: &Path, log: &mut ErrorLog) {
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
            if !line.is_empty() && !self.deleted_id.is_match(&line) {
                log.record(
                    FindingKind::StructuralViolation,
                    format!(
                        "unexpected line in {}:{} (was '{}'); expecting catalog record id (9 digits)",
                        path.display(),
                        idx + 1,
                        line.trim()
                    ),
                );
            }
        }
    }

    /// Dollar-dup files are still produced daily but should stay empty
    fn verify_dollar_dup(&self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        let path = Artifact::for_run_date(&catalog::dollar_dup(), date).path(&services.locator)?;
        if !verify_file(log, &path) {
            return Ok(());
        }
        let Some(count) = gzip_line_count(log, &path) else {
            return Ok(());
        };
        if count > 0 {
            log.record(
                FindingKind::StructuralViolation,
                format!(
                    "spurious dollar_dup lines: {} should be empty (found {count} lines)",
                    path.display()
                ),
            );
        }
        Ok(())
    }

    fn verify_ingest_bibrecords(
        &self,
        services: &Services,
        date: NaiveDate,
        log: &mut ErrorLog,
    ) -> Result<()> {
        if !catalog::is_full_run(date) {
            return Ok(());
        }
        for name in INGEST_BIBRECORD_FILES {
            let path = services.locator.location_path(Location::IngestBibrecords, name)?;
            verify_file(log, &path);
        }
        Ok(())
    }

    fn verify_rights(&self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::rights, date) {
            self.verify_rights_file(services, &kind, date, log)?;
        }
        Ok(())
    }

    fn verify_rights_file(
        &self,
        services: &Services,
        kind: &ArtifactKind,
        date: NaiveDate,
        log: &mut ErrorLog,
    ) -> Result<()> {
        let path = Artifact::for_run_date(kind, date).path(&services.locator)?;
        if verify_file(log, &path) {
            validate_lines(log, &path, &self.rights_validator);
        }
        Ok(())
    }
}

impl Checker for PostZephir {
    fn name(&self) -> &'static str {
        "PostZephir"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        self.verify_catalog_archive(services, date, log)?;
        self.verify_catalog_prep(services, date, log)?;
        self.verify_dollar_dup(services, date, log)?;
        self.verify_ingest_bibrecords(services, date, log)?;
        self.verify_rights(services, date, log)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Fullness;
    use crate::verify::testing::{date, Fixture};
    use std::fs;

    const GOOD_RIGHTS: &str = "a.1\tic\tbib\tbibrights\taa";

    /// Every post-Zephir output for an update run, all well-formed
    fn complete_update_run(fx: &Fixture, run: NaiveDate) {
        fx.write(&catalog::catalog_archive(Fullness::Update), run, &["{}", "{}"]);
        fx.write(&catalog::ht_bib_export(Fullness::Update), run, &["{}", "{}"]);
        fx.write(&catalog::catalog_prep(Fullness::Update), run, &["{}", "{}"]);
        fx.write(&catalog::catalog_deletes(), run, &["000000001", "", "000000002"]);
        fx.write(&catalog::dollar_dup(), run, &[]);
        fx.write(&catalog::rights(Fullness::Update), run, &[GOOD_RIGHTS]);
    }

    fn run(fx: &Fixture, run: NaiveDate) -> ErrorLog {
        let mut checker = PostZephir::new().unwrap();
        let mut log = ErrorLog::new(checker.name());
        checker.run_for_date(&fx.services(), run, &mut log).unwrap();
        log
    }

    #[test]
    fn test_complete_update_run_is_clean() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        let log = run(&fx, d);
        assert!(log.is_empty(), "{:?}", log.messages());
    }

    #[test]
    fn test_missing_outputs_are_reported() {
        let fx = Fixture::new();
        let log = run(&fx, date(2023, 11, 15));
        // archive, deletes, prep, dollar_dup, rights
        assert_eq!(log.count(FindingKind::NotFound), 5);
        assert!(log
            .messages()
            .iter()
            .all(|m| m.starts_with("PostZephir: not found: ")));
    }

    #[test]
    fn test_update_archive_count_mismatch() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        fx.write(&catalog::ht_bib_export(Fullness::Update), d, &["{}", "{}", "{}"]);

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::CountMismatch), 1);
        assert!(log.messages()[0].contains("zephir_upd_20231114.json.gz = 2 + 0"));
    }

    fn full_run_fixture(run: NaiveDate) -> Fixture {
        let fx = Fixture::new();
        complete_update_run(&fx, run);
        fx.write(&catalog::catalog_prep(Fullness::Full), run, &["{}"]);
        fx.write(&catalog::rights(Fullness::Full), run, &[GOOD_RIGHTS]);
        for name in INGEST_BIBRECORD_FILES {
            fx.write_at(&fx.dir(Location::IngestBibrecords).join(name), &["x"]);
        }
        fx.write(&catalog::catalog_archive(Fullness::Full), run, &["{}"; 5]);
        fx.write(&catalog::ht_bib_export(Fullness::Full), run, &["{}"; 6]);
        fx
    }

    #[test]
    fn test_full_count_without_suppression_report_mismatches() {
        let d = date(2023, 11, 2);
        let fx = full_run_fixture(d);
        let log = run(&fx, d);
        assert_eq!(log.len(), 1, "{:?}", log.messages());
        assert_eq!(log.count(FindingKind::CountMismatch), 1);
    }

    #[test]
    fn test_full_count_with_suppression_report_matches() {
        let d = date(2023, 11, 2);
        let fx = full_run_fixture(d);
        let report_dir = fx.dir(Location::ZephirData).join("full");
        fs::create_dir_all(&report_dir).unwrap();
        fs::write(
            report_dir.join("zephir_full_monthly_rpt.txt"),
            "processed 6 records\n000000003: no unsuppressed items, not written\n",
        )
        .unwrap();

        let log = run(&fx, d);
        assert!(log.is_empty(), "{:?}", log.messages());
    }

    #[test]
    fn test_full_run_requires_ingest_bibrecords() {
        let d = date(2023, 11, 2);
        let fx = full_run_fixture(d);
        fs::remove_file(fx.dir(Location::IngestBibrecords).join("groove_full.tsv.gz")).unwrap();

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::NotFound), 1);
        assert!(log.messages().iter().any(|m| m.contains("groove_full.tsv.gz")));
    }

    #[test]
    fn test_bad_delete_and_dollar_dup_lines() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        fx.write(&catalog::catalog_deletes(), d, &["000000001", "12345"]);
        fx.write(&catalog::dollar_dup(), d, &["uc1.b312920"]);

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::StructuralViolation), 2);
        assert!(log.messages().iter().any(|m| m.contains("(was '12345')")));
        assert!(log.messages().iter().any(|m| m.contains("found 1 lines")));
    }

    #[test]
    fn test_rights_column_violation() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        fx.write(
            &catalog::rights(Fullness::Update),
            d,
            &[GOOD_RIGHTS, "a.1\ticus\tbib\tbibrights\taa"],
        );

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::StructuralViolation), 1);
        assert!(log.messages()[0].contains("invalid column rights"));
    }

    #[test]
    fn test_corrupt_archive_does_not_hide_later_checks() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        // plain text under a .gz name
        fs::write(fx.path(&catalog::catalog_archive(Fullness::Update), d), "{}\n{}\n").unwrap();
        fx.write(
            &catalog::rights(Fullness::Update),
            d,
            &[GOOD_RIGHTS, "a.1\ticus\tbib\tbibrights\taa"],
        );

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::Unreadable), 1, "{:?}", log.messages());
        assert!(log.messages()[0].contains("zephir_upd_20231114.json.gz at line 1"));
        assert_eq!(log.count(FindingKind::CountMismatch), 0);
        assert_eq!(log.count(FindingKind::StructuralViolation), 1);
        assert!(log.messages()[1].contains("invalid column rights"));
    }

    #[test]
    fn test_invalid_utf8_rights_line_keeps_later_violations() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        complete_update_run(&fx, d);
        fs::write(
            fx.path(&catalog::rights(Fullness::Update), d),
            b"a.1\tic\tbib\tbibrights\ta\xffa\na.2\ticus\tbib\tbibrights\taa\n",
        )
        .unwrap();

        let log = run(&fx, d);
        assert_eq!(log.count(FindingKind::Unreadable), 0);
        assert!(log
            .messages()
            .iter()
            .any(|m| m.contains("zephir_upd_20231114.rights:2: invalid column rights")));
    }
}
