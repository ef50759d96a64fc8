//! SQLite-backed catalog of every IMDb identifier seen on a watchlist.
//!
//! One row per identifier. Each mutating call is a single statement, so it is
//! committed before the call returns.

mod migrations;

pub use migrations::CURRENT_SCHEMA_VERSION;

use crate::error::CatalogError;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, DatabaseName, OptionalExtension};
use sickadd_models::{CatalogRecord, ImdbId, ShowKind, TvdbId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

const RECORD_COLUMNS: &str = "imdb_id, title, watchlist_url, imdb_import_date, show_type, \
     thetvdb_id, added_to_sickchill, sc_added_date";

/// Legacy rows may carry `''` instead of NULL for a missing TheTVDB id.
const MISSING_TVDB_ID: &str = "(thetvdb_id IS NULL OR thetvdb_id = '')";

pub struct Catalog {
    conn: Mutex<Connection>,
    location: PathBuf,
}

impl Catalog {
    /// Open (or create) the catalog at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let unavailable = |reason: String| CatalogError::StorageUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        // SQLite silently falls back to read-only when the file isn't writable
        if conn
            .is_readonly(DatabaseName::Main)
            .map_err(|e| unavailable(e.to_string()))?
        {
            return Err(unavailable("database file is read-only".to_string()));
        }
        migrations::run_migrations(&conn).map_err(|e| unavailable(e.to_string()))?;

        info!(path = %path.display(), "Opened catalog");
        Ok(Self {
            conn: Mutex::new(conn),
            location: path.to_path_buf(),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: PathBuf::from(":memory:"),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn schema_version(&self) -> Result<i64, CatalogError> {
        let conn = self.conn()?;
        migrations::schema_version(&conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    /// Identifiers already classified as series or not, with their titles.
    pub fn lookup_known_titles(&self) -> Result<HashMap<ImdbId, String>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT imdb_id, title FROM shows WHERE show_type = 0 OR show_type = 1")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            Ok((ImdbId::from_stored(id), title.unwrap_or_default()))
        })?;

        let mut known = HashMap::new();
        for row in rows {
            let (id, title) = row?;
            known.insert(id, title);
        }
        Ok(known)
    }

    /// Insert a new record; callers de-duplicate first.
    pub fn insert(&self, record: &CatalogRecord) -> Result<(), CatalogError> {
        let conn = self.conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM shows WHERE imdb_id = ?1",
                params![record.id.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(CatalogError::DuplicateId(record.id.to_string()));
        }

        conn.execute(
            "INSERT INTO shows (imdb_id, title, watchlist_url, imdb_import_date, show_type, \
             thetvdb_id, added_to_sickchill, sc_added_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.as_str(),
                record.title,
                record.source_list,
                record.discovered_at.format(DATE_FORMAT).to_string(),
                record.kind.to_db(),
                record.tvdb_id.map(|id| id.get() as i64),
                record.registered as i64,
                record.registered_at.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;
        debug!(imdb_id = %record.id, kind = ?record.kind, title = %record.title, "Inserted catalog record");
        Ok(())
    }

    pub fn find_series_missing_cross_ref(&self) -> Result<Vec<(ImdbId, String)>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT imdb_id, title FROM shows WHERE show_type = 1 AND {} ORDER BY imdb_id",
            MISSING_TVDB_ID
        ))?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            Ok((ImdbId::from_stored(id), title.unwrap_or_default()))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }

    /// Fill in the TheTVDB id of a series that has none yet.
    ///
    /// Returns false when there was nothing to fill: an existing id is never replaced.
    pub fn set_cross_ref(&self, id: &ImdbId, tvdb_id: TvdbId) -> Result<bool, CatalogError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            &format!(
                "UPDATE shows SET thetvdb_id = ?1 WHERE imdb_id = ?2 AND show_type = 1 AND {}",
                MISSING_TVDB_ID
            ),
            params![tvdb_id.get() as i64, id.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn find_unregistered_resolved_series(&self) -> Result<Vec<(TvdbId, String)>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT thetvdb_id, title FROM shows \
             WHERE show_type = 1 AND COALESCE(added_to_sickchill, 0) = 0 AND NOT {} \
             ORDER BY imdb_id",
            MISSING_TVDB_ID
        ))?;
        let rows = stmt.query_map([], |row| {
            let tvdb_id: Value = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            Ok((tvdb_id_from_value(tvdb_id), title.unwrap_or_default()))
        })?;

        let mut series = Vec::new();
        for row in rows {
            if let (Some(tvdb_id), title) = row? {
                series.push((tvdb_id, title));
            }
        }
        Ok(series)
    }

    /// Flag every unregistered series with this TheTVDB id as registered.
    ///
    /// Returns the number of rows that changed; already registered rows keep
    /// their original date.
    pub fn mark_registered(&self, tvdb_id: TvdbId, date: NaiveDate) -> Result<usize, CatalogError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE shows SET added_to_sickchill = 1, sc_added_date = ?1 \
             WHERE thetvdb_id = ?2 AND show_type = 1 AND COALESCE(added_to_sickchill, 0) = 0",
            params![date.format(DATE_FORMAT).to_string(), tvdb_id.get() as i64],
        )?;
        Ok(changed)
    }

    /// Returns false when no record had this identifier.
    pub fn delete_by_id(&self, id: &str) -> Result<bool, CatalogError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM shows WHERE imdb_id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub fn get(&self, id: &str) -> Result<Option<CatalogRecord>, CatalogError> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM shows WHERE imdb_id = ?1", RECORD_COLUMNS),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn all_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shows ORDER BY imdb_import_date, imdb_id",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }
}

fn tvdb_id_from_value(value: Value) -> Option<TvdbId> {
    match value {
        Value::Integer(n) if n > 0 => Some(TvdbId(n as u64)),
        Value::Text(s) => s.parse::<TvdbId>().ok(),
        _ => None,
    }
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CatalogRecord> {
    let id: String = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    let source_list: Option<String> = row.get(2)?;
    let discovered_at: Option<String> = row.get(3)?;
    let show_type: Value = row.get(4)?;
    let tvdb_id: Value = row.get(5)?;
    let registered: Option<i64> = row.get(6)?;
    let registered_at: Option<String> = row.get(7)?;

    let kind = match show_type {
        Value::Integer(n) => ShowKind::from_db(Some(n)),
        _ => ShowKind::Unclassified,
    };

    Ok(CatalogRecord {
        id: ImdbId::from_stored(id),
        title: title.unwrap_or_default(),
        source_list: source_list.unwrap_or_default(),
        discovered_at: parse_date(discovered_at).unwrap_or_default(),
        kind,
        tvdb_id: tvdb_id_from_value(tvdb_id),
        registered: registered.unwrap_or(0) != 0,
        registered_at: parse_date(registered_at),
    })
}

#[cfg(test)]
mod tests;
