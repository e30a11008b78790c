//! Slot repository contracts plus SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide a named-slot get/put/remove API, the local-storage analogue
//!   used by `PersistedStore`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Writes replace the whole slot value (upsert), never append.
//! - Reading an absent slot yields `Ok(None)`, not an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Slot repository error for key validation and backend failures.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    Db(DbError),
    /// Backend could not serve the request (quota, I/O, closed handle).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid slot key `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for named slot storage.
pub trait SlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove_slot(&self, key: &str) -> RepoResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &R {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).write_slot(key, value)
    }

    fn remove_slot(&self, key: &str) -> RepoResult<()> {
        (**self).remove_slot(key)
    }
}

/// SQLite-backed slot repository over the `slots` table.
#[derive(Clone, Copy)]
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute("DELETE FROM slots WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// In-memory slot repository.
///
/// Clones share the same underlying map, which lets tests model two store
/// instances bound to one storage area.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotRepository {
    slots: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a repository pre-seeded with one raw slot value.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let repo = Self::new();
        repo.slots.borrow_mut().insert(key.into(), value.into());
        repo
    }

    /// Returns the raw stored value for `key`, bypassing key validation.
    pub fn raw_slot(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}
