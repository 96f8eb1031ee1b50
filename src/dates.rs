//! Monthly reporting cycle and the "current" date window
//!
//! The cycle boundary is the first day of the calendar month. A reference date
//! on the first of the month has a window of exactly one day; every later date
//! looks back to the first of its own month and never into the prior cycle.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Compact datestamp format used in filenames and the journal
pub const COMPACT_FORMAT: &str = "%Y%m%d";

/// Hyphenated datestamp format used by upstream exports
pub const HYPHENATED_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date '{0}': expected YYYYMMDD or YYYY-MM-DD")]
    InvalidDate(String),
}

/// Dates considered current for a single reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    reference: NaiveDate,
}

impl DateWindow {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn cycle_start(&self) -> NaiveDate {
        cycle_start(self.reference)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        dates_in_window(self.reference)
    }
}

/// The first of the month containing `reference`
pub fn cycle_start(reference: NaiveDate) -> NaiveDate {
    reference.with_day(1).unwrap_or(reference)
}

/// Every date from the cycle start up to and including `reference`, ascending
pub fn dates_in_window(reference: NaiveDate) -> Vec<NaiveDate> {
    cycle_start(reference)
        .iter_days()
        .take_while(|date| *date <= reference)
        .collect()
}

pub fn is_cycle_boundary(date: NaiveDate) -> bool {
    date.day() == 1
}

/// Parse a compact or hyphenated date
pub fn parse_date(text: &str) -> Result<NaiveDate, DateError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, COMPACT_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, HYPHENATED_FORMAT))
        .map_err(|_| DateError::InvalidDate(text.to_string()))
}

pub fn compact(date: NaiveDate) -> String {
    date.format(COMPACT_FORMAT).to_string()
}
