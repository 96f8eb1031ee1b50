//! Read-only access to the rights and hathifiles database

use anyhow::{bail, Context, Result};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Queries the verifiers issue against the relational database
pub trait Database {
    /// Whether `hf_log` has a row for the hathifile named `filename`
    fn log_entry_exists(&self, filename: &str) -> Result<bool>;

    /// Number of rows in `table`
    fn table_count(&self, table: &str) -> Result<u64>;

    /// Subset of `(namespace, id)` pairs present in `rights_current`, as `namespace.id`
    fn rights_present(&self, htids: &[(String, String)]) -> Result<HashSet<String>>;
}

/// Tables the verifiers are allowed to count
const COUNTABLE_TABLES: [&str; 3] = ["hf", "hf_log", "rights_current"];

pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    pub fn open_readonly(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.busy_timeout(busy_timeout)
            .context("Failed to set database busy timeout")?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Database for SqliteDatabase {
    fn log_entry_exists(&self, filename: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM hf_log WHERE hathifile = ?1",
                [filename],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to query hf_log for {filename}"))?;
        Ok(count > 0)
    }

    fn table_count(&self, table: &str) -> Result<u64> {
        if !COUNTABLE_TABLES.contains(&table) {
            bail!("Refusing to count unknown table '{table}'");
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .with_context(|| format!("Failed to count {table}"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn rights_present(&self, htids: &[(String, String)]) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        if htids.is_empty() {
            return Ok(found);
        }

        // SQLite caps bound parameters, so large slices are chunked again here
        for chunk in htids.chunks(400) {
            let placeholders = vec!["(?, ?)"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT namespace, id FROM rights_current WHERE (namespace, id) IN (VALUES {placeholders})"
            );
            let params = chunk.iter().flat_map(|(ns, id)| [ns.as_str(), id.as_str()]);
            let mut stmt = self
                .conn
                .prepare(&sql)
                .context("Failed to prepare rights_current query")?;
            let rows = stmt
                .query_map(params_from_iter(params), |row| {
                    Ok(format!("{}.{}", row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .context("Failed to query rights_current")?;
            for row in rows {
                found.insert(row?);
            }
        }

        debug!(requested = htids.len(), found = found.len(), "rights_current lookup");
        Ok(found)
    }
}
