pub mod functions;
pub mod queries;
pub mod summary;
pub mod tables;
pub mod values;

use anyhow::{Context, Result};
use policyseed_core::Outcome;
use rusqlite::{params_from_iter, Connection, Row};
use std::path::Path;

pub use queries::Built;
pub use summary::DatasetSummary;

/// SQLite rendition of the benchmark schema.
pub const SCHEMA: &str = include_str!("schema.sql");

/// Seeder connection to the benchmark database.
///
/// Single-threaded: the seeder owns the connection for the whole run.
pub struct SeedDb {
    conn: Connection,
}

impl SeedDb {
    /// Open (or create) the database file at `path`.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir for {}", path.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        tracing::debug!("opened seed database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        functions::register(&conn).context("register policy_checksum")?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create any missing benchmark tables.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("apply benchmark schema")?;
        tracing::info!("benchmark schema ready");
        Ok(())
    }

    // ── Purge ──────────────────────────────────────────────────────────

    /// Delete every seeded row, children before parents.
    pub fn purge(&self) -> Result<()> {
        for (table, built) in queries::purge_all() {
            let deleted =
                sq_execute(&self.conn, built).with_context(|| format!("purge {table}"))?;
            tracing::debug!("purged {deleted} rows from {table}");
        }
        Ok(())
    }

    // ── Inserts ────────────────────────────────────────────────────────

    pub fn insert_team(&self, id: u32, name: &str, description: &str) -> Result<()> {
        sq_execute(&self.conn, queries::insert_team(id, name, description))
            .with_context(|| format!("insert team {id}"))?;
        Ok(())
    }

    pub fn insert_policy(&self, id: u32, team_id: Option<u32>, name: &str) -> Result<()> {
        sq_execute(&self.conn, queries::insert_policy(id, team_id, name))
            .with_context(|| format!("insert policy {id}"))?;
        Ok(())
    }

    pub fn insert_host(&self, id: u32, team_id: Option<u32>) -> Result<()> {
        sq_execute(&self.conn, queries::insert_host(id, team_id))
            .with_context(|| format!("insert host {id}"))?;
        Ok(())
    }

    /// Insert one host's memberships as a single statement. No-op for an
    /// empty batch.
    pub fn insert_memberships(&self, host_id: u32, rows: &[(u32, Outcome)]) -> Result<()> {
        let Some(built) = queries::insert_memberships(host_id, rows) else {
            return Ok(());
        };
        sq_execute(&self.conn, built)
            .with_context(|| format!("insert memberships for host {host_id}"))?;
        Ok(())
    }

    // ── Summary ────────────────────────────────────────────────────────

    pub fn summary(&self) -> Result<DatasetSummary> {
        summary::collect(&self.conn)
    }
}

// ── sea-query execution helpers ────────────────────────────────────────

/// Execute a built statement through the connection's statement cache.
pub fn sq_execute(conn: &Connection, built: Built) -> rusqlite::Result<usize> {
    let (sql, values) = built;
    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.execute(params_from_iter(values::bind_values(&values)))
}

pub fn sq_query_row<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    conn.query_row(&sql, params_from_iter(values::bind_values(&values)), f)
}

pub fn sq_query_map<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values::bind_values(&values)), f)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}
