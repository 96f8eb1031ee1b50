//! Earliest missing datestamp across the expected artifact kinds
//!
//! A date missing from any one kind invalidates that date's batch, so the
//! reprocessing agenda starts at the minimum over all kinds.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::artifacts::{catalog, ArtifactKind, ArtifactLocator, LocatorError};
use crate::dates::DateWindow;

pub struct MissingDateFinder<'a> {
    locator: &'a ArtifactLocator,
    kinds: Vec<ArtifactKind>,
}

impl<'a> MissingDateFinder<'a> {
    /// Finder over the standard inventory kinds
    pub fn new(locator: &'a ArtifactLocator) -> Self {
        Self::with_kinds(locator, catalog::inventory_kinds())
    }

    pub fn with_kinds(locator: &'a ArtifactLocator, kinds: Vec<ArtifactKind>) -> Self {
        Self { locator, kinds }
    }

    pub fn kinds(&self) -> &[ArtifactKind] {
        &self.kinds
    }

    /// Dates `kind` must have on disk for the window ending at `reference`
    pub fn required_dates(kind: &ArtifactKind, window: &DateWindow) -> BTreeSet<NaiveDate> {
        if kind.is_full() {
            BTreeSet::from([window.cycle_start()])
        } else {
            window.dates().into_iter().collect()
        }
    }

    /// Earliest datestamp in the window for which any kind is absent
    pub fn earliest_missing_date(
        &self,
        reference: NaiveDate,
    ) -> Result<Option<NaiveDate>, LocatorError> {
        let window = DateWindow::new(reference);
        let mut earliest: Option<NaiveDate> = None;

        for kind in &self.kinds {
            let required = Self::required_dates(kind, &window);
            let present = self.locator.inventory(kind)?;
            let missing = required.difference(&present).next().copied();

            debug!(
                kind = kind.name,
                required = required.len(),
                present = present.len(),
                ?missing,
                "inventory"
            );

            if let Some(date) = missing {
                earliest = Some(earliest.map_or(date, |e| e.min(date)));
            }
        }

        info!(%reference, ?earliest, "computed earliest missing date");
        Ok(earliest)
    }
}
