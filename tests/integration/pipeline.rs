use postzephir::commands::{process, verify};
use postzephir::config::Config;
use postzephir::journal::Journal;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

use crate::helpers::date;

fn config(root: &TempDir) -> Config {
    let mut config = Config {
        data_root: Some(root.path().join("data")),
        ..Config::default()
    };
    config.process.home = Some(root.path().join("bin"));
    config
}

#[test]
fn test_journal_round_trip_through_yaml_file() {
    let root = TempDir::new().unwrap();
    let path = Journal::destination_path(root.path());
    Journal::new([date(2023, 11, 3), date(2023, 11, 2), date(2023, 11, 3)])
        .write(&path)
        .unwrap();
    let loaded = Journal::load(&path).unwrap();
    assert_eq!(loaded.dates(), &[date(2023, 11, 2), date(2023, 11, 3)]);
}

#[cfg(unix)]
#[test]
#[serial]
fn test_process_then_verify_journal() {
    use crate::helpers::executable;

    let root = TempDir::new().unwrap();
    let config = config(&root);
    let bin = root.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::create_dir_all(config.data_root()).unwrap();
    let calls = root.path().join("calls.log");
    let record = format!("echo \"$(basename \"$0\") $1\" >> {}", calls.display());
    executable(&bin.join(&config.process.full_script), &record);
    executable(&bin.join(&config.process.incremental_script), &record);

    process::execute_for(&config, date(2023, 11, 2), false).unwrap();

    let calls = fs::read_to_string(&calls).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(
        calls,
        vec![
            "run_zephir_full_monthly.sh 20231101",
            "run_process_zephir_incremental.sh 20231101",
            "run_process_zephir_incremental.sh 20231102",
        ]
    );

    let journal = Journal::load(&Journal::destination_path(&config.data_root())).unwrap();
    assert_eq!(journal.dates(), &[date(2023, 11, 2), date(2023, 11, 3)]);

    // findings are reported, not raised
    verify::execute(&config, verify::Target::Journal).unwrap();
}

#[cfg(unix)]
#[test]
#[serial]
fn test_failed_script_journals_completed_dates() {
    use crate::helpers::executable;

    let root = TempDir::new().unwrap();
    let config = config(&root);
    let bin = root.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::create_dir_all(config.data_root()).unwrap();
    executable(&bin.join(&config.process.full_script), "exit 0");
    executable(
        &bin.join(&config.process.incremental_script),
        "[ \"$1\" = 20231102 ] && exit 1; exit 0",
    );

    assert!(process::execute_for(&config, date(2023, 11, 3), false).is_err());

    let journal = Journal::load(&Journal::destination_path(&config.data_root())).unwrap();
    assert_eq!(journal.dates(), &[date(2023, 11, 2)]);
}

#[test]
fn test_verify_without_journal_fails() {
    let root = TempDir::new().unwrap();
    let config = config(&root);
    assert!(verify::execute(&config, verify::Target::Journal).is_err());
}
