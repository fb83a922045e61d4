//! Store type definitions
//!
//! Rows read back from the store and records written to the import log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::identity::{CreatedId, EntityKind, UserId};

/// Lightweight view of an existing user account
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub role_name: String,
    pub dept_id: Option<i64>,
    pub is_active: bool,
}

/// Import log record handed to an [`ImportLogSink`](super::ImportLogSink)
#[derive(Debug, Clone)]
pub struct NewImportLog {
    pub user_id: UserId,
    pub import_type: EntityKind,
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Serialized per-row outcomes
    pub details: serde_json::Value,
    pub imported_ids: Vec<CreatedId>,
    pub source_file: Option<String>,
    pub file_hash: Option<String>,
}

/// A stored import log entry
#[derive(Debug, Clone, Serialize)]
pub struct ImportLogEntry {
    pub log_id: i64,
    pub user_id: String,
    pub import_type: String,
    pub total_rows: i64,
    pub successful: i64,
    pub failed: i64,
    pub skipped: i64,
    pub details: serde_json::Value,
    pub imported_ids: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}
