//! Filename templates with a single embedded datestamp

use chrono::NaiveDate;
use regex::Regex;

use super::LocatorError;
use crate::dates::{COMPACT_FORMAT, HYPHENATED_FORMAT};

const COMPACT_TOKEN: &str = "yyyymmdd";
const HYPHENATED_TOKEN: &str = "yyyy-mm-dd";

/// Shape of the date placeholder inside a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `YYYYMMDD`
    Compact,
    /// `YYYY-MM-DD`
    Hyphenated,
}

impl Placeholder {
    fn token(self) -> &'static str {
        match self {
            Placeholder::Compact => COMPACT_TOKEN,
            Placeholder::Hyphenated => HYPHENATED_TOKEN,
        }
    }

    pub fn format(self) -> &'static str {
        match self {
            Placeholder::Compact => COMPACT_FORMAT,
            Placeholder::Hyphenated => HYPHENATED_FORMAT,
        }
    }

    fn capture(self) -> &'static str {
        match self {
            Placeholder::Compact => r"([0-9]{8})",
            Placeholder::Hyphenated => r"([0-9]{4}-[0-9]{2}-[0-9]{2})",
        }
    }
}

/// A filename such as `zephir_upd_YYYYMMDD.json.gz`
///
/// The placeholder is matched case-insensitively and must occur exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    raw: String,
}

struct Split<'a> {
    prefix: &'a str,
    placeholder: Placeholder,
    suffix: &'a str,
}

impl FilenameTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn placeholder(&self) -> Result<Placeholder, LocatorError> {
        self.split().map(|split| split.placeholder)
    }

    /// Substitute `date` into the placeholder
    pub fn render(&self, date: NaiveDate) -> Result<String, LocatorError> {
        let split = self.split()?;
        Ok(format!(
            "{}{}{}",
            split.prefix,
            date.format(split.placeholder.format()),
            split.suffix
        ))
    }

    /// Anchored regex matching rendered filenames, capturing the datestamp
    pub fn pattern(&self) -> Result<Regex, LocatorError> {
        let split = self.split()?;
        let pattern = format!(
            "^{}{}{}$",
            regex::escape(split.prefix),
            split.placeholder.capture(),
            regex::escape(split.suffix)
        );
        Regex::new(&pattern).map_err(|e| LocatorError::InvalidTemplate {
            template: self.raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Extract the datestamp from a filename rendered by this template
    pub fn match_date(&self, pattern: &Regex, filename: &str) -> Option<NaiveDate> {
        let placeholder = self.placeholder().ok()?;
        let captured = pattern.captures(filename)?.get(1)?;
        NaiveDate::parse_from_str(captured.as_str(), placeholder.format()).ok()
    }

    fn split(&self) -> Result<Split<'_>, LocatorError> {
        // ASCII lowercasing keeps byte offsets aligned with `raw`
        let lowered = self.raw.to_ascii_lowercase();
        let mut found: Vec<(usize, Placeholder)> = Vec::new();
        for placeholder in [Placeholder::Compact, Placeholder::Hyphenated] {
            found.extend(
                lowered
                    .match_indices(placeholder.token())
                    .map(|(idx, _)| (idx, placeholder)),
            );
        }

        match found.as_slice() {
            [(idx, placeholder)] => Ok(Split {
                prefix: &self.raw[..*idx],
                placeholder: *placeholder,
                suffix: &self.raw[idx + placeholder.token().len()..],
            }),
            [] => Err(LocatorError::InvalidTemplate {
                template: self.raw.clone(),
                reason: "no YYYYMMDD or YYYY-MM-DD placeholder".to_string(),
            }),
            _ => Err(LocatorError::InvalidTemplate {
                template: self.raw.clone(),
                reason: format!("{} date placeholders, expected exactly one", found.len()),
            }),
        }
    }
}
