//! Runtime configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables (`DATA_ROOT`, `CATALOG_PREP`, `SOLR_URL`, ...), so
//! deployments that only set the environment keep working.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artifacts::{ArtifactLocator, Location};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "POSTZEPHIR_CONFIG";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 6 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_root: Option<PathBuf>,
    pub locations: BTreeMap<Location, PathBuf>,
    pub search: SearchConfig,
    pub database: DatabaseConfig,
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the Solr core, may embed basic auth credentials
    pub url: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SearchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Directory holding the pipeline shell scripts
    pub home: Option<PathBuf>,
    pub full_script: String,
    pub incremental_script: String,
    pub timeout_secs: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            home: None,
            full_script: "run_zephir_full_monthly.sh".to_string(),
            incremental_script: "run_process_zephir_incremental.sh".to_string(),
            timeout_secs: DEFAULT_SCRIPT_TIMEOUT_SECS,
        }
    }
}

impl ProcessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        match &self.home {
            Some(home) => home.join(script),
            None => PathBuf::from(script),
        }
    }
}

impl Config {
    /// Load from `path`, or from `$POSTZEPHIR_CONFIG`, then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Apply overrides from a key lookup such as the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        for location in Location::ALL {
            if let Some(value) = lookup(location.env_var()) {
                if location == Location::DataRoot {
                    self.data_root = Some(PathBuf::from(value));
                } else {
                    self.locations.insert(location, PathBuf::from(value));
                }
            }
        }
        if let Some(url) = lookup("SOLR_URL") {
            self.search.url = Some(url);
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(home) = lookup("ROOTDIR") {
            self.process.home = Some(PathBuf::from(home));
        }
    }

    pub fn data_root(&self) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Directory for every location that is configured or has a default
    pub fn directories(&self) -> BTreeMap<Location, PathBuf> {
        let data_root = self.data_root();
        let mut dirs = BTreeMap::new();
        dirs.insert(Location::DataRoot, data_root.clone());
        dirs.insert(Location::CatalogArchive, data_root.join("catalog_archive"));
        dirs.insert(Location::CatalogPrep, data_root.join("catalog_prep"));
        dirs.insert(Location::RightsDir, data_root.join("rights"));
        dirs.insert(Location::TmpDir, data_root.join("work"));
        dirs.insert(Location::IngestBibrecords, data_root.join("ingest_bibrecords"));

        for (location, dir) in &self.locations {
            dirs.insert(*location, dir.clone());
        }
        if !self.locations.contains_key(&Location::RightsArchive) {
            if let Some(rights) = dirs.get(&Location::RightsDir).cloned() {
                dirs.insert(Location::RightsArchive, rights.join("archive"));
            }
        }
        dirs
    }

    pub fn locator(&self) -> ArtifactLocator {
        ArtifactLocator::new(self.directories())
    }
}
