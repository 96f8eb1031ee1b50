//! Path resolution and directory inventory for artifact kinds

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::kind::{ArtifactKind, Location};
use super::LocatorError;

/// Maps symbolic locations to directories and artifact kinds to files
#[derive(Debug, Clone, Default)]
pub struct ArtifactLocator {
    directories: BTreeMap<Location, PathBuf>,
}

impl ArtifactLocator {
    pub fn new(directories: BTreeMap<Location, PathBuf>) -> Self {
        Self { directories }
    }

    /// Register or replace the directory for `location`
    pub fn with_location(mut self, location: Location, dir: impl Into<PathBuf>) -> Self {
        self.directories.insert(location, dir.into());
        self
    }

    pub fn directory(&self, location: Location) -> Result<&Path, LocatorError> {
        self.directories
            .get(&location)
            .map(PathBuf::as_path)
            .ok_or(LocatorError::UnknownLocation(location))
    }

    /// A non-dated file directly inside `location`
    pub fn location_path(&self, location: Location, filename: &str) -> Result<PathBuf, LocatorError> {
        Ok(self.directory(location)?.join(filename))
    }

    /// Concrete path of the `kind` file stamped `datestamp`
    pub fn resolve(&self, kind: &ArtifactKind, datestamp: NaiveDate) -> Result<PathBuf, LocatorError> {
        let filename = kind.template.render(datestamp)?;
        self.location_path(kind.location, &filename)
    }

    /// Datestamps of `kind` files present in the kind's configured directory
    pub fn inventory(&self, kind: &ArtifactKind) -> Result<BTreeSet<NaiveDate>, LocatorError> {
        let directory = self.directory(kind.location)?;
        self.dates_present(kind, directory)
    }

    /// Datestamps of `kind` files present in `directory`
    ///
    /// Non-matching entries and directories are skipped, and a missing
    /// directory yields an empty set. When the kind declares an archive subdirectory it is
    /// scanned too.
    pub fn dates_present(
        &self,
        kind: &ArtifactKind,
        directory: &Path,
    ) -> Result<BTreeSet<NaiveDate>, LocatorError> {
        let pattern = kind.template.pattern()?;
        let mut dates = BTreeSet::new();

        let mut directories = vec![directory.to_path_buf()];
        if let Some(subdir) = kind.archive_subdir {
            directories.push(directory.join(subdir));
        }

        for dir in &directories {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(kind = kind.name, dir = %dir.display(), "directory absent, skipping");
                    continue;
                }
                Err(source) => {
                    return Err(LocatorError::Io {
                        path: dir.clone(),
                        source,
                    })
                }
            };

            for entry in entries {
                let entry = entry.map_err(|source| LocatorError::Io {
                    path: dir.clone(),
                    source,
                })?;
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    continue;
                };
                let Some(date) = kind.template.match_date(&pattern, name) else {
                    continue;
                };
                // follows symlinks, so a linked artifact still counts
                if entry.path().is_file() {
                    dates.insert(date);
                }
            }
        }

        Ok(dates)
    }
}
