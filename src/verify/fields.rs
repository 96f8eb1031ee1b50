//! Column-position regex validation for delimited records

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    ColumnCount { expected: usize, found: usize },
    Field {
        name: &'static str,
        value: String,
        pattern: String,
    },
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::ColumnCount { expected, found } => {
                write!(f, "wrong column count: found {found}, expected {expected}")
            }
            FieldViolation::Field {
                name,
                value,
                pattern,
            } => write!(f, "invalid column {name} ('{value}') does not match {pattern}"),
        }
    }
}

/// Validates each line of a delimited file against per-column regexes
#[derive(Debug, Clone)]
pub struct FieldValidator {
    delimiter: char,
    fields: Vec<FieldSpec>,
}

impl FieldValidator {
    pub fn new(delimiter: char, specs: &[(&'static str, &str)]) -> Result<Self> {
        let fields = specs
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern)
                    .map(|regex| FieldSpec { name, regex })
                    .with_context(|| format!("Invalid pattern for field {name}: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { delimiter, fields })
    }

    /// Tab-separated `.rights` records
    pub fn rights() -> Result<Self> {
        Self::new('\t', RIGHTS_FIELDS)
    }

    /// Tab-separated hathifile records
    pub fn hathifile() -> Result<Self> {
        Self::new('\t', HATHIFILE_FIELDS)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Every violation in `line`
    ///
    /// A column-count mismatch is reported alone; otherwise every
    /// non-matching field is reported, in column order.
    pub fn validate_line(&self, line: &str) -> Vec<FieldViolation> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let values: Vec<&str> = line.split(self.delimiter).collect();

        if values.len() != self.fields.len() {
            return vec![FieldViolation::ColumnCount {
                expected: self.fields.len(),
                found: values.len(),
            }];
        }

        values
            .iter()
            .zip(&self.fields)
            .filter(|(value, field)| !field.regex.is_match(value))
            .map(|(value, field)| FieldViolation::Field {
                name: field.name,
                value: value.to_string(),
                pattern: field.regex.as_str().to_string(),
            })
            .collect()
    }
}

pub const RIGHTS_FIELDS: &[(&str, &str)] = &[
    // namespace.objid
    ("id", r"^[a-z0-9]+\.\S+$"),
    ("rights", r"^(ic|pd|pdus|und)$"),
    ("bib", r"^bib$"),
    ("bibrights", r"^bibrights$"),
    // e.g. 'ia', 'cornell-ms', 'yale2'
    ("digitization_source", r"^[a-z0-9]+(-[a-z0-9]+)*$"),
];

pub const HATHIFILE_FIELDS: &[(&str, &str)] = &[
    ("htid", r"^[a-z0-9]{2,4}\.\S+$"),
    ("access", r"^(allow|deny)$"),
    ("rights", r"^[a-z0-9\-.]+$"),
    ("ht_bib_key", r"^[0-9]{9}$"),
    ("description", r"^.*$"),
    // NUC/MARC organization code
    ("source", r"^[A-Z]+$"),
    // blank source bib nums are likely a generation bug, but allowed
    ("source_bib_num", r"^\S*$"),
    ("oclc_num", r"^([0-9]+)?(,[0-9]+)*$"),
    ("isbn", r"^.*$"),
    ("issn", r"^.*$"),
    ("lccn", r"^.*$"),
    ("title", r"^.*$"),
    ("imprint", r"^.*$"),
    ("rights_reason_code", r"^[a-z]+$"),
    ("rights_timestamp", r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$"),
    ("us_gov_doc_flag", r"^[01]$"),
    ("rights_date_used", r"^[0-9]+$"),
    // may be whitespace
    ("pub_place", r"^.{2,3}$"),
    ("lang", r"^.{0,3}$"),
    ("bib_fmt", r"^[A-Z]+$"),
    ("collection_code", r"^[A-Z]+$"),
    ("content_provider_code", r"^[a-z\-_]+$"),
    ("responsible_entity_code", r"^[a-z-]+$"),
    // optional trailing digit, as in yale2
    ("digitization_agent_code", r"^[a-z-]+[0-9]?$"),
    ("access_profile_code", r"^[a-z+]+$"),
    ("author", r"^.*$"),
];
