//! Note store: owner of the single migrated SQLite connection.
//!
//! # Responsibility
//! - Own the physical persistence of the `notes` table.
//! - Hand out readable and writable handles to callers.
//!
//! # Invariants
//! - The wrapped connection is fully migrated before the store exists.
//! - Access is serialized through one mutex; SQLite provides atomicity of
//!   each statement. No extra transaction scope is added here.

use super::migrations::current_user_version;
use super::{open_db, open_db_in_memory, DbResult};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Shared note store.
///
/// `NoteStore` is `Send + Sync`; share it with `Arc`.
#[derive(Debug)]
pub struct NoteStore {
    location: StoreLocation,
    conn: Mutex<Connection>,
}

impl NoteStore {
    /// Opens (creating on first run) the store file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path)?;
        Ok(Self {
            location: StoreLocation::File(path),
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self {
            location: StoreLocation::Memory,
            conn: Mutex::new(conn),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Returns the applied schema version.
    pub fn schema_version(&self) -> DbResult<u32> {
        current_user_version(&self.reader())
    }

    /// Returns a read handle. Readers see the last committed state.
    pub fn reader(&self) -> StoreReader<'_> {
        StoreReader {
            guard: self.lock(),
        }
    }

    /// Returns a write handle.
    pub fn writer(&self) -> StoreWriter<'_> {
        StoreWriter {
            guard: self.lock(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Statements are atomic on the SQLite side; a poisoned lock still
        // guards a consistent connection.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only view of the store connection.
pub struct StoreReader<'a> {
    guard: MutexGuard<'a, Connection>,
}

impl Deref for StoreReader<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.guard
    }
}

/// Mutable view of the store connection.
pub struct StoreWriter<'a> {
    guard: MutexGuard<'a, Connection>,
}

impl Deref for StoreWriter<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.guard
    }
}

impl DerefMut for StoreWriter<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.guard
    }
}
