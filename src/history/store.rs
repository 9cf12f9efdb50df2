//! SQLite backed download history.

use super::record::{HistoryRecord, HistoryStatus, NewRecord, TIME_FORMAT};
use crate::error::{Error, Result};

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Number of records per history page.
pub const PAGE_SIZE: u64 = 20;

const SELECT_COLUMNS: &str = "SELECT id, filename, url, status, start_time, end_time, size FROM download_history";

/// Append-only ledger of finished downloads.
///
/// Every operation holds the connection lock for its whole duration, so id
/// assignment and page counts stay consistent across threads.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Open (or create) the ledger stored at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Opening history database {:?}", path);
        Self::init(Connection::open(path)?)
    }

    /// Open a ledger that lives only as long as the returned store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS download_history (
                id INTEGER PRIMARY KEY UNIQUE,
                filename TEXT NOT NULL,
                url TEXT NOT NULL,
                status TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                size TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::Internal(format!("history lock poisoned: {}", e)))
    }

    /// Append a record and return its id, one above the highest existing id.
    pub fn add(&self, record: &NewRecord) -> Result<i64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM download_history",
            [],
            |row| row.get(0),
        )?;
        let id = id + 1;
        tx.execute(
            "INSERT INTO download_history (id, filename, url, status, start_time, end_time, size) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                record.filename,
                record.url,
                record.status.to_string(),
                record.start_time.format(TIME_FORMAT).to_string(),
                record.end_time.format(TIME_FORMAT).to_string(),
                record.size,
            ],
        )?;
        tx.commit()?;
        debug!("Added history record #{} ({})", id, record.status);
        Ok(id)
    }

    /// Fetch a single record.
    pub fn get(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Number of records in the ledger.
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        count(&conn)
    }

    /// Number of pages, `0` for an empty ledger.
    pub fn page_count(&self) -> Result<u64> {
        Ok(pages_for(self.count()?))
    }

    /// Records of page `page` (1-based), newest first.
    pub fn page(&self, page: u64) -> Result<Vec<HistoryRecord>> {
        let conn = self.lock()?;
        let pages = pages_for(count(&conn)?);
        if page == 0 || page > pages {
            return Err(Error::OutOfRange { page, pages });
        }

        let offset = (page - 1) * PAGE_SIZE;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY id DESC LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![PAGE_SIZE as i64, offset as i64], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Delete a record. Returns whether it existed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM download_history WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Delete every record. Returns the number of deleted records.
    pub fn clear(&self) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM download_history", [])?;
        debug!("Cleared {} history record(s)", deleted);
        Ok(deleted as u64)
    }
}

fn count(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM download_history", [], |row| {
        row.get(0)
    })?;
    Ok(total as u64)
}

fn pages_for(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let status: String = row.get(3)?;
    Ok(HistoryRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        url: row.get(2)?,
        status: status.parse().unwrap_or(HistoryStatus::Other(status)),
        start_time: parse_time(row, 4)?,
        end_time: parse_time(row, 5)?,
        size: row.get(6)?,
    })
}
