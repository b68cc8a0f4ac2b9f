//! Database connection management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name inside the data directory.
const DB_FILE: &str = "cinedeck.db";

/// How long a writer waits for another process holding the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database in `dir` or the default data directory
/// and runs migrations.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved, the database cannot be
/// opened or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = resolve_db_path(dir)?;
    open_db_at(&db_path)
}

/// Opens (or creates) the database file at `db_path`.
///
/// The file is switched to WAL journaling so a reader in one process does
/// not block a writer in another.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the database
/// cannot be opened or migrations fail.
fn open_db_at(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    let journal: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to enable WAL journaling")?;

    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %db_path.display(), journal, "database opened");

    Ok(conn)
}

/// Resolves the database file path.
///
/// `{dir}/cinedeck.db` when `dir` is given, otherwise
/// `$XDG_DATA_HOME/cinedeck/cinedeck.db`, falling back to
/// `~/.local/share/cinedeck/cinedeck.db`.
///
/// # Errors
///
/// Returns an error if neither `XDG_DATA_HOME` nor `HOME` is set (when
/// `dir` is `None`).
fn resolve_db_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_db_path_from(dir, |name| std::env::var(name).ok())
}

fn resolve_db_path_from(
    dir: Option<&PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(DB_FILE));
    }

    if let Some(data_home) = env("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(data_home).join("cinedeck").join(DB_FILE));
    }
    let Some(home) = env("HOME").filter(|v| !v.is_empty()) else {
        bail!("neither XDG_DATA_HOME nor HOME is set");
    };
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("cinedeck")
        .join(DB_FILE))
}
