//! Result reporter: per-row outcomes, batch totals and the import log

use serde::Serialize;

use crate::core::identity::{CreatedId, EntityKind, UserId};
use crate::core::store::{ImportLogSink, NewImportLog};

use super::orchestrator::BatchRun;

/// Result of one input row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub row_number: usize,
    /// Natural key as written in the row (may be blank on errors)
    pub key: String,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeKind {
    Success {
        created_id: CreatedId,
        message: String,
    },
    Skipped {
        #[serde(rename = "message")]
        reason: String,
    },
    Error {
        message: String,
    },
}

impl RowOutcome {
    pub fn success(row_number: usize, key: String, created_id: CreatedId, message: String) -> Self {
        Self {
            row_number,
            key,
            kind: OutcomeKind::Success {
                created_id,
                message,
            },
        }
    }

    pub fn skipped(row_number: usize, key: String, reason: String) -> Self {
        Self {
            row_number,
            key,
            kind: OutcomeKind::Skipped { reason },
        }
    }

    pub fn error(row_number: usize, key: String, message: String) -> Self {
        Self {
            row_number,
            key,
            kind: OutcomeKind::Error { message },
        }
    }

    pub fn status(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Success { .. } => "success",
            OutcomeKind::Skipped { .. } => "skipped",
            OutcomeKind::Error { .. } => "error",
        }
    }

    pub fn message(&self) -> &str {
        match &self.kind {
            OutcomeKind::Success { message, .. } => message,
            OutcomeKind::Skipped { reason } => reason,
            OutcomeKind::Error { message } => message,
        }
    }

    pub fn created_id(&self) -> Option<CreatedId> {
        match self.kind {
            OutcomeKind::Success { created_id, .. } => Some(created_id),
            _ => None,
        }
    }
}

/// Totals plus every row outcome, in file order
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub entity_type: EntityKind,
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<RowOutcome>,
}

impl BatchResult {
    /// Identifiers of the rows that succeeded
    pub fn created_ids(&self) -> Vec<CreatedId> {
        self.results.iter().filter_map(RowOutcome::created_id).collect()
    }
}

/// Fold outcomes into totals, keeping their order
pub fn summarize(kind: EntityKind, outcomes: Vec<RowOutcome>) -> BatchResult {
    let mut result = BatchResult {
        entity_type: kind,
        total_rows: outcomes.len(),
        successful: 0,
        failed: 0,
        skipped: 0,
        results: Vec::new(),
    };

    for outcome in &outcomes {
        match outcome.kind {
            OutcomeKind::Success { .. } => result.successful += 1,
            OutcomeKind::Skipped { .. } => result.skipped += 1,
            OutcomeKind::Error { .. } => result.failed += 1,
        }
    }
    result.results = outcomes;
    result
}

/// Where the imported rows came from
#[derive(Debug, Clone, Default)]
pub struct LogSource {
    pub file_name: Option<String>,
    pub file_hash: Option<String>,
}

/// Record a finished batch in the import log
///
/// Nothing is written for runs that never reached the store. A sink failure
/// only produces a warning; the import itself stands.
pub fn record<S: ImportLogSink + ?Sized>(
    sink: &mut S,
    caller: &UserId,
    run: &BatchRun,
    source: &LogSource,
) -> Option<i64> {
    if !run.committed {
        return None;
    }

    let result = &run.result;
    let details = match serde_json::to_value(&result.results) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "could not serialize import details");
            return None;
        }
    };

    let log = NewImportLog {
        user_id: *caller,
        import_type: result.entity_type,
        total_rows: result.total_rows,
        successful: result.successful,
        failed: result.failed,
        skipped: result.skipped,
        details,
        imported_ids: result.created_ids(),
        source_file: source.file_name.clone(),
        file_hash: source.file_hash.clone(),
    };

    match sink.record_import_log(&log) {
        Ok(id) => {
            tracing::info!(log_id = id, kind = %result.entity_type, "import log recorded");
            Some(id)
        }
        Err(e) => {
            tracing::warn!(error = %e, kind = %result.entity_type, "failed to record import log");
            None
        }
    }
}
