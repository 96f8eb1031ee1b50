//! Catalog records reaching the search index

use anyhow::Result;
use chrono::NaiveDate;

use crate::artifacts::{catalog, Artifact};
use crate::verify::engine::{Checker, Services};
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::{gzip_line_count, verify_file};

pub const NON_DELETED_FILTER: &str = "deleted:false";

/// Records indexed since midnight UTC of `date`
pub fn indexed_since_filter(date: NaiveDate) -> String {
    format!("time_of_index:[{}T00:00:00Z TO NOW]", date.format("%Y-%m-%d"))
}

#[derive(Default)]
pub struct CatalogIndex;

impl Checker for CatalogIndex {
    fn name(&self) -> &'static str {
        "CatalogIndex"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        for kind in catalog::kinds_for_run_date(catalog::catalog_archive, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            if !verify_file(log, &path) {
                continue;
            }
            let Some(catalog_count) = gzip_line_count(log, &path) else {
                continue;
            };
            let catalog_count = catalog_count as u64;

            let (filter, description) = if kind.is_full() {
                (NON_DELETED_FILTER.to_string(), "existed".to_string())
            } else {
                (
                    indexed_since_filter(date),
                    format!("had time_of_index on or after {date}"),
                )
            };
            let index_count = services.search()?.result_count(&filter)?;
            if index_count < catalog_count {
                log.record(
                    FindingKind::ExternalInconsistency,
                    format!(
                        "{} had {catalog_count} records, but only {index_count} {description} in solr ({filter})",
                        path.display()
                    ),
                );
            }
        }
        Ok(())
    }
}
