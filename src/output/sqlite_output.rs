//! SQLite report writer
//!
//! Appends every run to a single database: one `runs` row with the run's
//! metadata and counters, plus its findings in `broken_links`.

use crate::output::traits::{BrokenLink, OutputResult, ReportWriter, RunSummary};
use rusqlite::{params, Connection};
use std::fs;
use std::path::PathBuf;

/// SQL schema for the report database
pub const SCHEMA_SQL: &str = r#"
-- One row per audit run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    start_url TEXT NOT NULL,
    scope TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    config_hash TEXT,
    start_failure TEXT,
    pages_visited INTEGER NOT NULL,
    pages_extracted INTEGER NOT NULL,
    links_discovered INTEGER NOT NULL,
    checks_performed INTEGER NOT NULL,
    broken_links INTEGER NOT NULL
);

-- Findings, in the order they were recorded
CREATE TABLE IF NOT EXISTS broken_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    origin TEXT NOT NULL,
    status TEXT NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_broken_links_run ON broken_links(run_id);
CREATE INDEX IF NOT EXISTS idx_broken_links_url ON broken_links(url);
"#;

/// Writes reports into a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteReportWriter {
    database_path: PathBuf,
}

impl SqliteReportWriter {
    /// Creates a writer for the database at `database_path`
    ///
    /// The file and its tables are created on first write.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    fn open(&self) -> OutputResult<Connection> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.database_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }
}

impl ReportWriter for SqliteReportWriter {
    fn write(&self, summary: &RunSummary, rows: &[BrokenLink]) -> OutputResult<PathBuf> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let stats = &summary.statistics;

        tx.execute(
            "INSERT INTO runs (label, start_url, scope, started_at, finished_at, config_hash,
                start_failure, pages_visited, pages_extracted, links_discovered,
                checks_performed, broken_links)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                summary.label,
                summary.start_url,
                summary.scope,
                summary.started_at.to_rfc3339(),
                summary.finished_at.to_rfc3339(),
                summary.config_hash,
                summary.start_failure,
                stats.pages_visited as i64,
                stats.pages_extracted as i64,
                stats.links_discovered as i64,
                stats.checks_performed as i64,
                rows.len() as i64,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert = tx.prepare(
                "INSERT INTO broken_links (run_id, origin, status, url) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                insert.execute(params![run_id, row.origin, row.status.to_string(), row.url])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Stored run {} ({} rows) in database", run_id, rows.len());

        Ok(self.database_path.clone())
    }
}
