//! Versioned schema migrations for the `shows` table.
//!
//! The version lives in `PRAGMA user_version`. Databases written before
//! versioning existed report 0, so every step checks the actual schema
//! before changing it. Steps are additive only and each one commits together
//! with its version bump.

use crate::error::CatalogError;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

/// Increment when adding a migration.
pub const CURRENT_SCHEMA_VERSION: i64 = 3;

pub fn schema_version(conn: &Connection) -> Result<i64, CatalogError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, CatalogError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn run_migrations(conn: &Connection) -> Result<(), CatalogError> {
    let current_version = schema_version(conn)?;

    if current_version == CURRENT_SCHEMA_VERSION {
        debug!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than this build ({}). Proceeding without migrating.",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    let steps: [(i64, fn(&Connection) -> Result<(), CatalogError>); 3] =
        [(1, migrate_v1), (2, migrate_v2), (3, migrate_v3)];

    for (version, migrate) in steps {
        if current_version < version {
            let tx = conn.unchecked_transaction()?;
            migrate(&tx)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
            info!("Migration v{} completed", version);
        }
    }

    Ok(())
}

/// The original table, before items other than series were stored.
fn migrate_v1(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS shows (
            imdb_id TEXT PRIMARY KEY,
            title TEXT,
            watchlist_url TEXT,
            imdb_import_date TEXT,
            added_to_sickchill INTEGER,
            thetvdb_id INTEGER,
            sc_added_date TEXT
        );
        "#,
    )?;
    Ok(())
}

/// Adds `show_type`. Rows that predate it were all series.
fn migrate_v2(conn: &Connection) -> Result<(), CatalogError> {
    if has_column(conn, "shows", "show_type")? {
        debug!("Migration v2: show_type already present");
        return Ok(());
    }

    conn.execute("ALTER TABLE shows ADD COLUMN show_type INTEGER", [])?;
    let backfilled = conn.execute("UPDATE shows SET show_type = 1", [])?;
    info!(
        "Migration v2: added show_type, marked {} existing rows as TV series",
        backfilled
    );
    Ok(())
}

fn migrate_v3(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_shows_thetvdb_id ON shows(thetvdb_id);")?;
    Ok(())
}
