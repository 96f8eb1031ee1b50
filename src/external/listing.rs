//! Published hathifile listing manifest

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Filenames found in a listing, plus the entries that lacked one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub filenames: HashSet<String>,
    /// Zero-based indexes of entries without a string `filename`
    pub malformed: Vec<usize>,
}

impl Listing {
    pub fn contains(&self, filename: &str) -> bool {
        self.filenames.contains(filename)
    }
}

/// Parse a JSON array of `{"filename": ..., ...}` objects
pub fn parse_listing(json: &str) -> Result<Listing> {
    let value: Value = serde_json::from_str(json).context("Listing is not valid JSON")?;
    let Value::Array(entries) = value else {
        bail!("Listing is not a JSON array");
    };

    let mut listing = Listing::default();
    for (idx, entry) in entries.iter().enumerate() {
        match entry.get("filename").and_then(Value::as_str) {
            Some(name) => {
                listing.filenames.insert(name.to_string());
            }
            None => listing.malformed.push(idx),
        }
    }
    Ok(listing)
}

pub fn load_listing(path: &Path) -> Result<Listing> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing: {}", path.display()))?;
    parse_listing(&json).with_context(|| format!("Failed to parse listing: {}", path.display()))
}
