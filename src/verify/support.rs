//! Checks shared by several checkers
//!
//! Content helpers never raise on a bad artifact. A stream that cannot be
//! decoded is recorded as `Unreadable` and the helper returns `None`, so the
//! caller skips only the checks that need that artifact's content.

use std::fmt::Display;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

use super::fields::FieldValidator;
use super::findings::{ErrorLog, FindingKind};
use crate::fs::{read_lines, Lines};

/// Record `NotFound` or `Unreadable` for `path`
///
/// Returns true when the file exists and can be opened; callers skip content
/// checks otherwise.
pub fn verify_file(log: &mut ErrorLog, path: &Path) -> bool {
    info!(checker = log.checker(), path = %path.display(), "verifying file exists and is readable");
    match File::open(path).and_then(|file| file.metadata()) {
        Ok(meta) if meta.is_dir() => {
            log.record(
                FindingKind::Unreadable,
                format!("not readable: {} (is a directory)", path.display()),
            );
            false
        }
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log.record(FindingKind::NotFound, format!("not found: {}", path.display()));
            false
        }
        Err(e) => {
            log.record(
                FindingKind::Unreadable,
                format!("not readable: {} ({e})", path.display()),
            );
            false
        }
    }
}

/// Open the content of `path`, recording `Unreadable` on failure
pub fn open_content(log: &mut ErrorLog, path: &Path) -> Option<Lines> {
    match read_lines(path) {
        Ok(lines) => Some(lines),
        Err(e) => {
            log.record(
                FindingKind::Unreadable,
                format!("not readable: {} ({e:#})", path.display()),
            );
            None
        }
    }
}

/// Record a stream error hit while reading line `lineno` of `path`
pub fn record_unreadable_line(log: &mut ErrorLog, path: &Path, lineno: usize, err: impl Display) {
    log.record(
        FindingKind::Unreadable,
        format!("not readable: {} at line {lineno} ({err})", path.display()),
    );
}

/// Line count of a gzip or plain artifact, `None` when the stream is unreadable
pub fn gzip_line_count(log: &mut ErrorLog, path: &Path) -> Option<usize> {
    info!(path = %path.display(), "getting line count");
    let lines = open_content(log, path)?;
    let mut count = 0;
    for line in lines {
        if let Err(e) = line {
            record_unreadable_line(log, path, count + 1, e);
            return None;
        }
        count += 1;
    }
    Some(count)
}

/// Check that each line of `path` parses as JSON, stopping at the first failure
///
/// `Some(false)` means a line did not parse; `None` means the stream itself
/// could not be read.
pub fn verify_parseable_ndj(log: &mut ErrorLog, path: &Path) -> Option<bool> {
    info!(checker = log.checker(), path = %path.display(), "verifying parseable newline-delimited json");
    let lines = open_content(log, path)?;
    for (idx, line) in lines.enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                record_unreadable_line(log, path, idx + 1, e);
                return None;
            }
        };
        if serde_json::from_str::<serde_json::Value>(&line).is_err() {
            log.record(
                FindingKind::StructuralViolation,
                format!("{} contains unparseable JSON at line {}", path.display(), idx + 1),
            );
            return Some(false);
        }
    }
    Some(true)
}

/// One side of a line-count comparison
#[derive(Debug, Clone, Copy)]
pub struct Counted<'a> {
    pub path: &'a Path,
    pub count: usize,
}

/// Require `downstream + exclusions == upstream`
pub fn count_cross_check(
    log: &mut ErrorLog,
    downstream: Counted<'_>,
    exclusions: usize,
    upstream: Counted<'_>,
) -> bool {
    if downstream.count + exclusions == upstream.count {
        return true;
    }
    log.record(
        FindingKind::CountMismatch,
        format!(
            "line count ({} = {} + {}) != upstream line count ({} = {})",
            downstream.path.display(),
            downstream.count,
            exclusions,
            upstream.path.display(),
            upstream.count
        ),
    );
    false
}

/// Run every line of `path` through `validator`, returning the line count
///
/// `None` when the stream breaks; violations found before that are kept.
pub fn validate_lines(log: &mut ErrorLog, path: &Path, validator: &FieldValidator) -> Option<usize> {
    info!(checker = log.checker(), path = %path.display(), "verifying contents");
    let lines = open_content(log, path)?;
    let mut count = 0;
    for line in lines {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                record_unreadable_line(log, path, count + 1, e);
                return None;
            }
        };
        count += 1;
        for violation in validator.validate_line(&line) {
            log.record(
                FindingKind::StructuralViolation,
                format!("{}:{}: {violation}", path.display(), count),
            );
        }
    }
    Some(count)
}
