//! SQLite storage utilities.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while a writer runs
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `synchronous = NORMAL` as the usual WAL pairing

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used when none is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the relationship database, apply runtime pragmas,
/// and migrate the schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening, configuring, or migrating the database
/// fails.
pub fn open(path: &Path) -> Result<Connection> {
    open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
}

/// [`open`] with an explicit busy timeout.
///
/// # Errors
///
/// Returns an error if opening, configuring, or migrating the database
/// fails.
pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open relationship database {}", path.display()))?;

    configure_connection(&conn, busy_timeout).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply relationship schema migrations")?;

    Ok(conn)
}

/// Open an in-memory database with the full schema applied.
///
/// # Errors
///
/// Returns an error if opening or migrating the database fails.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory database")?;
    migrations::migrate(&mut conn).context("apply relationship schema migrations")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
