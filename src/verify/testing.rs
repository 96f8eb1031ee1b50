//! Fixtures shared by checker tests

use anyhow::Result;
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

use super::engine::Services;
use crate::artifacts::{Artifact, ArtifactKind, ArtifactLocator, Location};
use crate::external::{Database, SearchIndex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn write_gz(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
    path
}

/// Every location mapped to its own directory under a temp root
pub struct Fixture {
    pub root: TempDir,
    pub locator: ArtifactLocator,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let mut locator = ArtifactLocator::default();
        for location in Location::ALL {
            let dir = root.path().join(location.env_var().to_lowercase());
            fs::create_dir_all(&dir).unwrap();
            locator = locator.with_location(location, dir);
        }
        Self { root, locator }
    }

    pub fn dir(&self, location: Location) -> &Path {
        self.locator.directory(location).unwrap()
    }

    pub fn path(&self, kind: &ArtifactKind, run_date: NaiveDate) -> PathBuf {
        Artifact::for_run_date(kind, run_date)
            .path(&self.locator)
            .unwrap()
    }

    /// Write the artifact of `kind` for `run_date`, gzip-compressed when the name ends in `.gz`
    pub fn write(&self, kind: &ArtifactKind, run_date: NaiveDate, lines: &[&str]) -> PathBuf {
        let path = self.path(kind, run_date);
        self.write_at(&path, lines);
        path
    }

    pub fn write_at(&self, path: &Path, lines: &[&str]) {
        let name = path.file_name().unwrap().to_str().unwrap();
        if name.ends_with(".gz") {
            write_gz(path.parent().unwrap(), name, lines);
        } else {
            let mut body = lines.join("\n");
            if !lines.is_empty() {
                body.push('\n');
            }
            fs::write(path, body).unwrap();
        }
    }

    pub fn services(&self) -> Services {
        Services::new(self.locator.clone())
    }
}

/// In-memory stand-in for the hathifiles and rights database
#[derive(Default, Clone)]
pub struct FakeDatabase {
    pub log_entries: HashSet<String>,
    pub hf_count: u64,
    pub rights: HashSet<String>,
    /// Size of each `rights_present` batch
    pub rights_batches: Rc<RefCell<Vec<usize>>>,
}

impl FakeDatabase {
    pub fn with_rights<'a>(mut self, htids: impl IntoIterator<Item = &'a str>) -> Self {
        self.rights.extend(htids.into_iter().map(str::to_string));
        self
    }
}

impl Database for FakeDatabase {
    fn log_entry_exists(&self, filename: &str) -> Result<bool> {
        Ok(self.log_entries.contains(filename))
    }

    fn table_count(&self, _table: &str) -> Result<u64> {
        Ok(self.hf_count)
    }

    fn rights_present(&self, htids: &[(String, String)]) -> Result<HashSet<String>> {
        self.rights_batches.borrow_mut().push(htids.len());
        Ok(htids
            .iter()
            .map(|(ns, id)| format!("{ns}.{id}"))
            .filter(|htid| self.rights.contains(htid))
            .collect())
    }
}

/// Search index answering fixed counts per filter
#[derive(Default, Clone)]
pub struct FakeSearchIndex {
    pub counts: HashMap<String, u64>,
    pub filters: Rc<RefCell<Vec<String>>>,
}

impl SearchIndex for FakeSearchIndex {
    fn result_count(&self, filter: &str) -> Result<u64> {
        self.filters.borrow_mut().push(filter.to_string());
        Ok(self.counts.get(filter).copied().unwrap_or(0))
    }
}
