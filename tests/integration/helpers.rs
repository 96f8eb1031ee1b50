use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use postzephir::artifacts::{ArtifactLocator, Location};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A locator with every location under its own directory in `root`
pub fn locator(root: &TempDir) -> ArtifactLocator {
    Location::ALL
        .into_iter()
        .fold(ArtifactLocator::default(), |locator, location| {
            let dir = root.path().join(location.env_var().to_lowercase());
            fs::create_dir_all(&dir).unwrap();
            locator.with_location(location, dir)
        })
}

/// Write `lines`, gzipped when the name ends in `.gz`
pub fn write_lines(path: &Path, lines: &[&str]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    } else {
        fs::write(path, content).unwrap();
    }
    path.to_path_buf()
}

#[cfg(unix)]
pub fn executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
