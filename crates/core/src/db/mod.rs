//! Output layout and the SQLite run ledger.
//!
//! The ledger keeps one row per verifier invocation (exit code, timeout flag,
//! timestamps, source hash). It is bookkeeping only: analysis never reads it,
//! so normalized results stay a function of the log text alone.

mod layout;

pub use layout::{ExperimentLayout, LEDGER_FILE_NAME};

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Error type for run ledger operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// One recorded verifier invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct InvocationRecord {
    pub benchmark: String,
    pub backend: String,
    pub strategy: Option<String>,
    pub log_path: String,
    /// SHA-256 of the benchmark source as it was when invoked.
    pub source_hash: Option<String>,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub started_at: String,
    pub finished_at: String,
}

/// SQLite-backed ledger of verifier invocations.
pub struct RunLedger {
    conn: Connection,
}

impl RunLedger {
    /// Open (or create) a ledger at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Insert an invocation record and return its row id.
    pub fn record(&self, record: &InvocationRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO invocations
                (benchmark, backend, strategy, log_path, source_hash,
                 exit_code, timed_out, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.benchmark,
                record.backend,
                record.strategy,
                record.log_path,
                record.source_hash,
                record.exit_code,
                record.timed_out,
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List invocations in insertion order, optionally filtered by backend name.
    pub fn list(&self, backend: Option<&str>) -> DbResult<Vec<InvocationRecord>> {
        fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<InvocationRecord> {
            Ok(InvocationRecord {
                benchmark: row.get(0)?,
                backend: row.get(1)?,
                strategy: row.get(2)?,
                log_path: row.get(3)?,
                source_hash: row.get(4)?,
                exit_code: row.get(5)?,
                timed_out: row.get(6)?,
                started_at: row.get(7)?,
                finished_at: row.get(8)?,
            })
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT benchmark, backend, strategy, log_path, source_hash,
                   exit_code, timed_out, started_at, finished_at
            FROM invocations
            WHERE ?1 IS NULL OR backend = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![backend], map_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: invocations table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS invocations (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                benchmark    TEXT NOT NULL,
                backend      TEXT NOT NULL,
                strategy     TEXT,
                log_path     TEXT NOT NULL,
                source_hash  TEXT,
                exit_code    INTEGER,
                timed_out    INTEGER NOT NULL,
                started_at   TEXT NOT NULL,
                finished_at  TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
