//! SQLite-backed store for imported entities and import logs
//!
//! The engine only talks to the store through two traits:
//! - [`ImportStore`] loads the lookup tables a batch needs and commits the
//!   staged entities in one transaction
//! - [`ImportLogSink`] records a finished batch
//!
//! [`SqliteStore`] implements both, plus the small seeding helpers the CLI
//! uses to create a workspace.

mod queries;
mod schema;
mod types;

pub use types::*;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode};
use thiserror::Error;

use crate::core::identity::UserId;
use crate::entities::NewEntity;

/// Current schema version - a store written by another version is refused
const SCHEMA_VERSION: i32 = 1;

/// Store operations the import engine depends on
pub trait ImportStore {
    /// Department name -> id
    fn department_ids(&self) -> Result<HashMap<String, i64>, StoreError>;

    /// Semester code -> id
    fn semester_ids(&self) -> Result<HashMap<String, i64>, StoreError>;

    /// Subject code -> id
    fn subject_ids(&self) -> Result<HashMap<String, i64>, StoreError>;

    /// Existing class codes
    fn class_codes(&self) -> Result<HashSet<String>, StoreError>;

    /// Role name -> id
    fn role_ids(&self) -> Result<HashMap<String, i64>, StoreError>;

    /// Email -> id for users holding the given role
    fn user_ids_with_role(&self, role_id: i64) -> Result<HashMap<String, UserId>, StoreError>;

    /// Every existing email
    fn user_emails(&self) -> Result<HashSet<String>, StoreError>;

    /// Next free subject id
    fn next_subject_id(&self) -> Result<i64, StoreError>;

    /// Next free class id
    fn next_class_id(&self) -> Result<i64, StoreError>;

    /// Persist every staged entity atomically, returning the number written
    fn commit(&mut self, staged: &[NewEntity]) -> Result<usize, StoreError>;
}

/// Destination for import logs
pub trait ImportLogSink {
    fn record_import_log(&mut self, log: &NewImportLog) -> Result<i64, StoreError>;
}

/// The store backed by SQLite
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Open a throwaway store (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Errors that can occur in store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("store schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: i32, expected: i32 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid stored value: {0}")]
    InvalidData(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

/// Timestamps are stored as fixed-width RFC 3339 so they sort as text
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp '{}': {}", s, e)))
}
