//! Published hathifiles and their entries in the download listing

use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;

use crate::artifacts::catalog::{self, LISTING_MANIFEST};
use crate::artifacts::{Artifact, Location};
use crate::external::{load_listing, Listing};
use crate::verify::engine::{Checker, Services};
use crate::verify::findings::{ErrorLog, FindingKind};
use crate::verify::support::verify_file;

/// The listing is read once and reused for every later date
#[derive(Default)]
pub struct HathifilesListing {
    listing: Option<Listing>,
}

impl HathifilesListing {
    fn listing(&mut self, manifest: &Path, log: &mut ErrorLog) -> &Listing {
        self.listing.get_or_insert_with(|| load_manifest(manifest, log))
    }
}

/// Load the manifest, recording problems with it as findings
///
/// An absent or unusable manifest lists nothing, so every published file is
/// then reported as unlisted.
fn load_manifest(manifest: &Path, log: &mut ErrorLog) -> Listing {
    if !verify_file(log, manifest) {
        return Listing::default();
    }
    match load_listing(manifest) {
        Ok(listing) => {
            for idx in &listing.malformed {
                log.record(
                    FindingKind::MalformedManifestEntry,
                    format!("entry {idx} in {} has no filename", manifest.display()),
                );
            }
            listing
        }
        Err(e) => {
            log.record(
                FindingKind::MalformedManifestEntry,
                format!("{} is not a listing of files ({e:#})", manifest.display()),
            );
            Listing::default()
        }
    }
}

impl Checker for HathifilesListing {
    fn name(&self) -> &'static str {
        "HathifilesListing"
    }

    fn run_for_date(&mut self, services: &Services, date: NaiveDate, log: &mut ErrorLog) -> Result<()> {
        let manifest = services
            .locator
            .location_path(Location::WwwDir, LISTING_MANIFEST)?;

        for kind in catalog::kinds_for_run_date(catalog::hathifile_www, date) {
            let path = Artifact::for_run_date(&kind, date).path(&services.locator)?;
            verify_file(log, &path);

            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if !self.listing(&manifest, log).contains(filename) {
                log.record(
                    FindingKind::MissingManifestEntry,
                    format!("no listing with filename: {filename} in {}", manifest.display()),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Fullness;
    use crate::verify::testing::{date, Fixture};
    use std::fs;

    fn write_manifest(fx: &Fixture, json: &str) {
        fs::write(fx.dir(Location::WwwDir).join(LISTING_MANIFEST), json).unwrap();
    }

    #[test]
    fn test_listed_hathifile_is_clean() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        fx.write(&catalog::hathifile_www(Fullness::Update), d, &["x"]);
        write_manifest(&fx, r#"[{"filename":"hathi_upd_20231115.txt.gz","size":1}]"#);

        let mut checker = HathifilesListing::default();
        let mut log = ErrorLog::new(checker.name());
        checker.run_for_date(&fx.services(), d, &mut log).unwrap();
        assert!(log.is_empty(), "{:?}", log.messages());
    }

    #[test]
    fn test_unlisted_and_malformed_entries() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        fx.write(&catalog::hathifile_www(Fullness::Update), d, &["x"]);
        write_manifest(&fx, r#"[{"filename":"hathi_upd_20231114.txt.gz"},{"size":1}]"#);

        let mut checker = HathifilesListing::default();
        let mut log = ErrorLog::new(checker.name());
        checker.run_for_date(&fx.services(), d, &mut log).unwrap();
        assert_eq!(log.count(FindingKind::MalformedManifestEntry), 1);
        assert_eq!(log.count(FindingKind::MissingManifestEntry), 1);
        assert!(log.messages()[1].contains("hathi_upd_20231115.txt.gz"));
    }

    #[test]
    fn test_listing_loaded_once() {
        let fx = Fixture::new();
        write_manifest(
            &fx,
            r#"[{"filename":"hathi_upd_20231114.txt.gz"},{"filename":"hathi_upd_20231115.txt.gz"}]"#,
        );
        let mut checker = HathifilesListing::default();
        let mut log = ErrorLog::new(checker.name());
        let services = fx.services();

        checker.run_for_date(&services, date(2023, 11, 14), &mut log).unwrap();
        fs::remove_file(fx.dir(Location::WwwDir).join(LISTING_MANIFEST)).unwrap();
        checker.run_for_date(&services, date(2023, 11, 15), &mut log).unwrap();

        // only the two hathifiles themselves are absent
        assert_eq!(log.len(), 2);
        assert_eq!(log.count(FindingKind::NotFound), 2);
    }

    #[test]
    fn test_missing_manifest_lists_nothing() {
        let fx = Fixture::new();
        let services = fx.services();
        let mut checker = HathifilesListing::default();
        let mut log = ErrorLog::new(checker.name());

        fx.write(&catalog::hathifile_www(Fullness::Update), date(2023, 11, 14), &["x"]);
        checker.run_for_date(&services, date(2023, 11, 14), &mut log).unwrap();
        assert_eq!(log.count(FindingKind::NotFound), 1);
        assert!(log.messages()[0].contains(LISTING_MANIFEST));
        assert_eq!(log.count(FindingKind::MissingManifestEntry), 1);

        // the absent manifest is reported once
        fx.write(&catalog::hathifile_www(Fullness::Update), date(2023, 11, 15), &["x"]);
        checker.run_for_date(&services, date(2023, 11, 15), &mut log).unwrap();
        assert_eq!(log.count(FindingKind::NotFound), 1);
        assert_eq!(log.count(FindingKind::MissingManifestEntry), 2);
    }

    #[test]
    fn test_invalid_manifest_json_is_malformed() {
        let fx = Fixture::new();
        let d = date(2023, 11, 15);
        fx.write(&catalog::hathifile_www(Fullness::Update), d, &["x"]);
        write_manifest(&fx, "{not json");

        let mut checker = HathifilesListing::default();
        let mut log = ErrorLog::new(checker.name());
        checker.run_for_date(&fx.services(), d, &mut log).unwrap();
        assert_eq!(log.count(FindingKind::MalformedManifestEntry), 1);
        assert_eq!(log.count(FindingKind::MissingManifestEntry), 1);
    }
}
