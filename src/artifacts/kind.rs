//! Artifact kinds and resolved artifacts

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use super::template::FilenameTemplate;
use super::{ArtifactLocator, LocatorError};

/// Symbolic storage location, mapped to a directory by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    DataRoot,
    CatalogArchive,
    CatalogPrep,
    RightsDir,
    RightsArchive,
    ZephirData,
    TmpDir,
    IngestBibrecords,
    HathifileArchive,
    WwwDir,
    RedirectsDir,
    RedirectsHistoryDir,
}

impl Location {
    pub const ALL: [Location; 12] = [
        Location::DataRoot,
        Location::CatalogArchive,
        Location::CatalogPrep,
        Location::RightsDir,
        Location::RightsArchive,
        Location::ZephirData,
        Location::TmpDir,
        Location::IngestBibrecords,
        Location::HathifileArchive,
        Location::WwwDir,
        Location::RedirectsDir,
        Location::RedirectsHistoryDir,
    ];

    /// Environment variable that overrides this location
    pub fn env_var(self) -> &'static str {
        match self {
            Location::DataRoot => "DATA_ROOT",
            Location::CatalogArchive => "CATALOG_ARCHIVE",
            Location::CatalogPrep => "CATALOG_PREP",
            Location::RightsDir => "RIGHTS_DIR",
            Location::RightsArchive => "RIGHTS_ARCHIVE",
            Location::ZephirData => "ZEPHIR_DATA",
            Location::TmpDir => "TMPDIR",
            Location::IngestBibrecords => "INGEST_BIBRECORDS",
            Location::HathifileArchive => "HATHIFILE_ARCHIVE",
            Location::WwwDir => "WWW_DIR",
            Location::RedirectsDir => "REDIRECTS_DIR",
            Location::RedirectsHistoryDir => "REDIRECTS_HISTORY_DIR",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Periodic snapshot or routine per-date delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fullness {
    Full,
    Update,
}

impl Fullness {
    pub fn is_full(self) -> bool {
        matches!(self, Fullness::Full)
    }

    /// Token used in filenames (`full` / `upd`)
    pub fn as_str(self) -> &'static str {
        match self {
            Fullness::Full => "full",
            Fullness::Update => "upd",
        }
    }
}

/// Immutable descriptor of one family of dated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKind {
    pub name: &'static str,
    pub location: Location,
    pub template: FilenameTemplate,
    pub fullness: Fullness,
    /// Subdirectory of `location` that is also scanned for presence
    pub archive_subdir: Option<&'static str>,
    /// Days from the run date to the datestamp on the file
    pub datestamp_offset: i64,
}

impl ArtifactKind {
    pub fn new(
        name: &'static str,
        location: Location,
        template: &str,
        fullness: Fullness,
    ) -> Self {
        Self {
            name,
            location,
            template: FilenameTemplate::new(template),
            fullness,
            archive_subdir: None,
            datestamp_offset: 0,
        }
    }

    pub fn with_archive_subdir(mut self, subdir: &'static str) -> Self {
        self.archive_subdir = Some(subdir);
        self
    }

    pub fn with_datestamp_offset(mut self, days: i64) -> Self {
        self.datestamp_offset = days;
        self
    }

    pub fn is_full(&self) -> bool {
        self.fullness.is_full()
    }

    /// Datestamp carried by the file produced on `run_date`
    pub fn datestamp_for(&self, run_date: NaiveDate) -> NaiveDate {
        let days = Days::new(self.datestamp_offset.unsigned_abs());
        let shifted = if self.datestamp_offset < 0 {
            run_date.checked_sub_days(days)
        } else {
            run_date.checked_add_days(days)
        };
        shifted.unwrap_or(run_date)
    }
}

/// A kind bound to a concrete datestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<'a> {
    pub kind: &'a ArtifactKind,
    pub datestamp: NaiveDate,
}

impl<'a> Artifact<'a> {
    pub fn new(kind: &'a ArtifactKind, datestamp: NaiveDate) -> Self {
        Self { kind, datestamp }
    }

    /// The artifact a pipeline run on `run_date` is expected to produce
    pub fn for_run_date(kind: &'a ArtifactKind, run_date: NaiveDate) -> Self {
        Self::new(kind, kind.datestamp_for(run_date))
    }

    pub fn is_full(&self) -> bool {
        self.kind.is_full()
    }

    pub fn path(&self, locator: &ArtifactLocator) -> Result<PathBuf, LocatorError> {
        locator.resolve(self.kind, self.datestamp)
    }
}
