//! Durable home of the key/value slots.
//!
//! One SQLite file holds a single `slots` table; every persisted store
//! (tasks, theme) owns one row of it. This module opens that file, applies
//! pragmas and brings the `slots` schema up to date.
//!
//! A file whose schema was written by a newer build is refused rather than
//! read with the wrong layout.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening the slot database or migrating its schema.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A migration script failed; nothing from the batch was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The `slots` schema is newer than this build understands.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration { version, source } => {
                write!(f, "slots migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "slots schema version {found} is newer than this build supports ({supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
