//! SQLite plumbing: open-or-create with embedded migrations.
//!
//! The store is one local file owned by one process. [`open_store`] validates
//! the path (parent directories are created, a directory path is rejected
//! with the offending path in the error), applies connection-wide PRAGMAs
//! (WAL journaling, foreign_keys=ON, a 5000ms busy_timeout) and runs the
//! embedded migrations so callers always see the `deployments` and `rides`
//! tables.

use std::path::Path;

use anyhow::{Context, bail};
use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Embedded Diesel migrations bundled with this crate.
///
/// Applied by [`open_store`] to bring the database schema up to date.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Open (creating as needed) the store at `path` and migrate its schema.
pub fn open_store(path: impl AsRef<Path>) -> anyhow::Result<SqliteConnection> {
    let path = path.as_ref();
    if path.is_dir() {
        bail!(
            "store path {} is a directory, expected a database file",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }
    }
    let url = path
        .to_str()
        .with_context(|| format!("store path {} is not valid UTF-8", path.display()))?;

    let mut conn = SqliteConnection::establish(url)
        .with_context(|| format!("failed to open store at {}", path.display()))?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to run store migrations")?;
    Ok(conn)
}
