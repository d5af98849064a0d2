//! Process-wide store handle.
//!
//! # Responsibility
//! - Hold the single SQLite connection shared by every request.
//! - Open (and migrate) that connection lazily on first use.
//!
//! # Invariants
//! - At most one connection is opened per `Store`.
//! - Callers only ever see the connection while holding the store lock.
//! - A failed open is not cached; the next call retries the open.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::info;
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file, created on first open.
    File(PathBuf),
    /// Private in-memory database that lives as long as the store.
    Memory,
}

/// Lazily opened, mutex-guarded SQLite connection.
pub struct Store {
    location: StoreLocation,
    conn: OnceCell<Mutex<Connection>>,
}

impl Store {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Returns whether the underlying connection has been opened yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Runs `op` against the shared connection, opening it first if needed.
    ///
    /// The store lock is held for the whole call, so `op` should stay short.
    pub fn with_conn<T, E>(&self, op: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let cell = self.conn.get_or_try_init(|| self.open())?;
        // A panic inside a previous `op` leaves the connection itself usable.
        let guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
        op(&guard)
    }

    fn open(&self) -> DbResult<Mutex<Connection>> {
        let conn = match &self.location {
            StoreLocation::File(path) => {
                info!(
                    "event=store_open module=db status=start path={}",
                    path.display()
                );
                open_db(path)?
            }
            StoreLocation::Memory => {
                info!("event=store_open module=db status=start path=:memory:");
                open_db_in_memory()?
            }
        };
        Ok(Mutex::new(conn))
    }
}
