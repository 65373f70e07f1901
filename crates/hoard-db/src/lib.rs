// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod items;
mod weapons;

pub use items::ItemStore;
pub use weapons::WeaponStore;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "hoard";
pub const DEFAULT_DB_FILE: &str = "hoard.db";

fn open_connection(path: &Path) -> Result<Connection> {
    let printable = path.to_string_lossy().to_string();
    validate_db_path(&printable)?;
    if printable == ":memory:" {
        return open_memory_connection();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open database at {}", path.display()))?;
    configure_connection(&conn)?;
    Ok(conn)
}

fn open_memory_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .context("configure busy timeout")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

/// Creates `table` from `create_sql` when absent, otherwise checks that every
/// required column exists. Never alters an existing table.
fn ensure_table(
    conn: &Connection,
    table: &str,
    create_sql: &str,
    required_columns: &[&str],
) -> Result<()> {
    if !table_exists(conn, table)? {
        conn.execute_batch(create_sql)
            .with_context(|| format!("create table `{table}`"))?;
        tracing::info!(table, "created table");
        return Ok(());
    }

    let columns = table_columns(conn, table)?;
    let missing: Vec<&str> = required_columns
        .iter()
        .copied()
        .filter(|column| !columns.contains(*column))
        .collect();
    if !missing.is_empty() {
        bail!(
            "table `{table}` is missing required columns: {}; point [storage].db_path at a hoard-compatible database",
            missing.join(", ")
        );
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .with_context(|| format!("count rows in {table}"))?;
    usize::try_from(count).with_context(|| format!("row count {count} out of range"))
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("HOARD_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set HOARD_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join(DEFAULT_DB_FILE))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}
