use postzephir::artifacts::{catalog, Artifact, ArtifactKind, Fullness};
use postzephir::journal::Journal;
use postzephir::verify::checkers::{CatalogIndex, PostZephir};
use postzephir::verify::{FindingKind, Services, VerificationEngine};
use tempfile::TempDir;

use crate::helpers::{date, locator, write_lines};

#[test]
fn test_missing_outputs_are_reported_per_journal_date() {
    let root = TempDir::new().unwrap();
    let services = Services::new(locator(&root));
    let mut engine = VerificationEngine::new(services);
    engine.register(Box::new(PostZephir::new().unwrap()));

    let journal = Journal::new([date(2023, 11, 15), date(2023, 11, 14)]);
    engine.run(&journal);

    let report = engine.report();
    assert_eq!(report.len(), 1);
    let (name, log) = report[0];
    assert_eq!(name, "PostZephir");
    assert!(!log.is_empty());
    assert_eq!(log.count(FindingKind::NotFound), log.len());
    assert!(log.findings()[0].message.contains("20231113"));
    assert!(log.findings().last().unwrap().message.contains("20231114"));
}

#[test]
fn test_clean_update_run_has_no_findings() {
    let root = TempDir::new().unwrap();
    let locator = locator(&root);
    let run_date = date(2023, 11, 15);
    let path = |kind: &ArtifactKind| {
        Artifact::for_run_date(kind, run_date).path(&locator).unwrap()
    };

    write_lines(&path(&catalog::catalog_archive(Fullness::Update)), &["{\"id\":1}", "{\"id\":2}"]);
    write_lines(&path(&catalog::ht_bib_export(Fullness::Update)), &["{\"id\":1}", "{\"id\":2}"]);
    write_lines(&path(&catalog::catalog_prep(Fullness::Update)), &["{\"id\":1}", "{\"id\":2}"]);
    write_lines(&path(&catalog::catalog_deletes()), &["000000001"]);
    write_lines(&path(&catalog::dollar_dup()), &[]);
    write_lines(&path(&catalog::rights(Fullness::Update)), &["a.1\tic\tbib\tbibrights\taa"]);

    let mut engine = VerificationEngine::new(Services::new(locator.clone()));
    engine.register(Box::new(PostZephir::new().unwrap()));
    engine.run_for_date(run_date);

    assert_eq!(engine.total_errors(), 0, "{:?}", engine.messages());
}

#[test]
fn test_missing_search_index_is_a_checker_failure() {
    let root = TempDir::new().unwrap();
    let locator = locator(&root);
    let run_date = date(2023, 11, 15);
    let archive = catalog::catalog_archive(Fullness::Update);
    write_lines(
        &Artifact::for_run_date(&archive, run_date).path(&locator).unwrap(),
        &["{}"],
    );

    let mut engine = VerificationEngine::new(Services::new(locator));
    engine.register(Box::new(CatalogIndex));
    engine.register(Box::new(PostZephir::new().unwrap()));
    engine.run_for_date(run_date);

    let report = engine.report();
    assert_eq!(report[0].1.count(FindingKind::CheckerFailure), 1);
    assert!(report[0].1.findings()[0].message.contains("SOLR_URL"));
    // the failure does not stop later checkers
    assert!(!report[1].1.is_empty());
}
