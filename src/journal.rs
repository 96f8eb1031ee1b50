//! Run journal: the dates a processing run claims to have handled
//!
//! The journal is a single non-datestamped YAML file of `YYYYMMDD` strings.
//! Each write replaces the previous run's journal.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dates::{compact, parse_date};

pub const JOURNAL_NAME: &str = "journal.yml";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to access journal {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed journal {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    dates: Vec<NaiveDate>,
}

impl Journal {
    /// Sorted, deduplicated journal
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn destination_path(data_root: &Path) -> PathBuf {
        data_root.join(JOURNAL_NAME)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, JournalError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                JournalError::NotFound(path.to_path_buf())
            } else {
                JournalError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let entries: Option<Vec<String>> =
            serde_yaml::from_str(&content).map_err(|e| JournalError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let dates = entries
            .unwrap_or_default()
            .iter()
            .map(|entry| parse_date(entry))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| JournalError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(dates))
    }

    /// Overwrite `path` with this journal
    pub fn write(&self, path: &Path) -> Result<(), JournalError> {
        let entries: Vec<String> = self.dates.iter().map(|d| compact(*d)).collect();
        let yaml = serde_yaml::to_string(&entries).map_err(|e| JournalError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, yaml).map_err(|source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
