//! The registered artifact kinds of the post-Zephir pipeline
//!
//! Post-Zephir derivatives carry the datestamp of the day before the run that
//! produced them. Hathifiles are stamped with the run date itself. Full
//! snapshots of every family are produced by the full run: the run whose
//! post-Zephir datestamp falls on a cycle boundary.

use chrono::NaiveDate;

use super::kind::{ArtifactKind, Fullness, Location};
use crate::dates::is_cycle_boundary;

/// Offset from run date to datestamp for files named after the Zephir export day
pub const POST_ZEPHIR_OFFSET: i64 = -1;

/// Monthly ingest bibrecord files, not datestamped
pub const INGEST_BIBRECORD_FILES: [&str; 2] = ["groove_full.tsv.gz", "zephir_ingested_items.txt.gz"];

/// Monthly report relative to `ZEPHIR_DATA`, counts records left out as suppressed
pub const SUPPRESSION_REPORT: &str = "full/zephir_full_monthly_rpt.txt";

/// Published listing of downloadable hathifiles inside `WWW_DIR`
pub const LISTING_MANIFEST: &str = "hathi_file_list.json";

/// Whether the run on `run_date` processes a cycle-boundary export
pub fn is_full_run(run_date: NaiveDate) -> bool {
    run_date
        .pred_opt()
        .is_some_and(is_cycle_boundary)
}

/// Members of a kind family expected from the run on `run_date`
///
/// The update kind is always expected; the full kind only on a full run.
pub fn kinds_for_run_date<F>(family: F, run_date: NaiveDate) -> Vec<ArtifactKind>
where
    F: Fn(Fullness) -> ArtifactKind,
{
    let mut kinds = vec![family(Fullness::Update)];
    if is_full_run(run_date) {
        kinds.push(family(Fullness::Full));
    }
    kinds
}

/// Kinds whose presence drives reprocessing, keyed by datestamp
pub fn inventory_kinds() -> Vec<ArtifactKind> {
    vec![
        ArtifactKind::new(
            "zephir_full",
            Location::CatalogPrep,
            "zephir_full_YYYYMMDD_vufind.json.gz",
            Fullness::Full,
        ),
        ArtifactKind::new(
            "zephir_full_rights",
            Location::RightsDir,
            "zephir_full_YYYYMMDD.rights",
            Fullness::Full,
        )
        .with_archive_subdir("archive"),
        ArtifactKind::new(
            "zephir_update",
            Location::CatalogPrep,
            "zephir_upd_YYYYMMDD.json.gz",
            Fullness::Update,
        ),
        ArtifactKind::new(
            "zephir_update_rights",
            Location::RightsDir,
            "zephir_upd_YYYYMMDD.rights",
            Fullness::Update,
        )
        .with_archive_subdir("archive"),
        ArtifactKind::new(
            "zephir_update_delete",
            Location::CatalogPrep,
            "zephir_upd_YYYYMMDD_delete.txt.gz",
            Fullness::Update,
        ),
    ]
}

fn zephir_catalog_template(fullness: Fullness) -> &'static str {
    match fullness {
        Fullness::Full => "zephir_full_YYYYMMDD_vufind.json.gz",
        Fullness::Update => "zephir_upd_YYYYMMDD.json.gz",
    }
}

/// Catalog records archived after post-Zephir processing
pub fn catalog_archive(fullness: Fullness) -> ArtifactKind {
    let name = match fullness {
        Fullness::Full => "catalog_archive_full",
        Fullness::Update => "catalog_archive_upd",
    };
    ArtifactKind::new(
        name,
        Location::CatalogArchive,
        zephir_catalog_template(fullness),
        fullness,
    )
    .with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

/// Catalog records staged for indexing
pub fn catalog_prep(fullness: Fullness) -> ArtifactKind {
    let name = match fullness {
        Fullness::Full => "catalog_prep_full",
        Fullness::Update => "catalog_prep_upd",
    };
    ArtifactKind::new(
        name,
        Location::CatalogPrep,
        zephir_catalog_template(fullness),
        fullness,
    )
    .with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

/// Catalog record ids removed from the index
pub fn catalog_deletes() -> ArtifactKind {
    ArtifactKind::new(
        "catalog_deletes",
        Location::CatalogPrep,
        "zephir_upd_YYYYMMDD_delete.txt.gz",
        Fullness::Update,
    )
    .with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

/// Items to report back as no longer ingested; expected to be empty
pub fn dollar_dup() -> ArtifactKind {
    ArtifactKind::new(
        "dollar_dup",
        Location::TmpDir,
        "vufind_incremental_YYYY-MM-DD_dollar_dup.txt.gz",
        Fullness::Update,
    )
    .with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

pub fn rights(fullness: Fullness) -> ArtifactKind {
    let (name, template) = match fullness {
        Fullness::Full => ("rights_full", "zephir_full_YYYYMMDD.rights"),
        Fullness::Update => ("rights_upd", "zephir_upd_YYYYMMDD.rights"),
    };
    ArtifactKind::new(name, Location::RightsArchive, template, fullness)
        .with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

/// The raw Zephir export; monthlies are moved, updates stay in the work dir
pub fn ht_bib_export(fullness: Fullness) -> ArtifactKind {
    let kind = match fullness {
        Fullness::Full => ArtifactKind::new(
            "ht_bib_export_full",
            Location::ZephirData,
            "ht_bib_export_full_YYYY-MM-DD.json.gz",
            fullness,
        ),
        Fullness::Update => ArtifactKind::new(
            "ht_bib_export_incr",
            Location::TmpDir,
            "ht_bib_export_incr_YYYY-MM-DD.json.gz",
            fullness,
        ),
    };
    kind.with_datestamp_offset(POST_ZEPHIR_OFFSET)
}

pub fn hathifile(fullness: Fullness) -> ArtifactKind {
    let (name, template) = match fullness {
        Fullness::Full => ("hathifile_full", "hathi_full_YYYYMMDD.txt.gz"),
        Fullness::Update => ("hathifile_upd", "hathi_upd_YYYYMMDD.txt.gz"),
    };
    ArtifactKind::new(name, Location::HathifileArchive, template, fullness)
}

/// Hathifiles published for download
pub fn hathifile_www(fullness: Fullness) -> ArtifactKind {
    let (name, template) = match fullness {
        Fullness::Full => ("hathifile_www_full", "hathi_full_YYYYMMDD.txt.gz"),
        Fullness::Update => ("hathifile_www_upd", "hathi_upd_YYYYMMDD.txt.gz"),
    };
    ArtifactKind::new(name, Location::WwwDir, template, fullness)
}
