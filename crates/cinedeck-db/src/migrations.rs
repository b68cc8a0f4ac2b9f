//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version > CURRENT_VERSION {
        bail!(
            "database schema v{version} was written by a newer cinedeck (supported: v{CURRENT_VERSION})"
        );
    }
    if version == CURRENT_VERSION {
        return Ok(());
    }

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;
    tracing::info!(from = version, to = CURRENT_VERSION, "database migrated");

    Ok(())
}

/// Migration to v1: create the `kv` snapshot table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );",
    )
    .context("failed to create kv table")?;

    Ok(())
}
