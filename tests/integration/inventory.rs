use chrono::{Datelike, Weekday};
use postzephir::artifacts::catalog::inventory_kinds;
use postzephir::artifacts::Artifact;
use postzephir::inventory::MissingDateFinder;
use std::fs;
use tempfile::TempDir;

use crate::helpers::{date, locator};

#[test]
fn test_november_gaps_report_earliest_across_kinds() {
    let root = TempDir::new().unwrap();
    let locator = locator(&root);
    let reference = date(2023, 11, 29);

    for kind in inventory_kinds() {
        for datestamp in date(2023, 11, 1).iter_days().take_while(|d| *d <= reference) {
            let skipped = (kind.name == "zephir_update" && datestamp == date(2023, 11, 11))
                || (kind.name == "zephir_update_rights" && datestamp == date(2023, 11, 18));
            if skipped {
                continue;
            }
            let path = Artifact::new(&kind, datestamp).path(&locator).unwrap();
            fs::write(path, "").unwrap();
        }
    }

    let earliest = MissingDateFinder::new(&locator)
        .earliest_missing_date(reference)
        .unwrap();
    assert_eq!(earliest, Some(date(2023, 11, 11)));
}

#[test]
fn test_weekday_only_exports_leave_weekend_gaps() {
    let root = TempDir::new().unwrap();
    let locator = locator(&root);
    let reference = date(2023, 11, 29);

    for kind in inventory_kinds() {
        for datestamp in date(2023, 11, 1).iter_days().take_while(|d| *d <= reference) {
            if matches!(datestamp.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            let path = Artifact::new(&kind, datestamp).path(&locator).unwrap();
            fs::write(path, "").unwrap();
        }
    }

    let earliest = MissingDateFinder::new(&locator)
        .earliest_missing_date(reference)
        .unwrap();
    assert_eq!(earliest, Some(date(2023, 11, 4)));
}

#[test]
fn test_archived_rights_count_as_present() {
    let root = TempDir::new().unwrap();
    let locator = locator(&root);
    let reference = date(2023, 11, 2);

    for kind in inventory_kinds() {
        for datestamp in [date(2023, 11, 1), date(2023, 11, 2)] {
            let mut path = Artifact::new(&kind, datestamp).path(&locator).unwrap();
            if let Some(subdir) = kind.archive_subdir {
                let archived = path.parent().unwrap().join(subdir);
                fs::create_dir_all(&archived).unwrap();
                path = archived.join(path.file_name().unwrap());
            }
            fs::write(path, "").unwrap();
        }
    }

    assert_eq!(
        MissingDateFinder::new(&locator)
            .earliest_missing_date(reference)
            .unwrap(),
        None
    );
}
