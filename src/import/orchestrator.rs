//! Batch orchestrator: drives every row of a parsed table through the
//! selected importer and owns the single commit at the end

use crate::core::identity::EntityKind;
use crate::core::store::ImportStore;

use super::cache::ReferenceCache;
use super::importer::{Importer, RowDisposition};
use super::parser::ParsedTable;
use super::report::{summarize, BatchResult, RowOutcome};
use super::ImportError;

/// Knobs for one batch
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Run every step except the commit and the import log
    pub dry_run: bool,
}

/// A finished batch
#[derive(Debug)]
pub struct BatchRun {
    pub result: BatchResult,
    /// Whether the batch reached the store (false for dry runs)
    pub committed: bool,
    /// Number of entities staged for the commit
    pub staged: usize,
}

/// Import every row of `table` as `kind`
///
/// Structural problems (missing columns, missing reference tables) fail
/// before any row runs. Row problems become outcomes. If the final commit
/// fails nothing is persisted and the whole call fails.
pub fn run_import<S: ImportStore + ?Sized>(
    store: &mut S,
    kind: EntityKind,
    table: &ParsedTable,
    options: ImportOptions,
) -> Result<BatchRun, ImportError> {
    let missing = table.missing_columns(kind.required_columns());
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            kind,
            columns: missing,
        });
    }

    let mut cache = ReferenceCache::build(&*store, kind)?;
    let importer = Importer::for_kind(kind);

    tracing::info!(kind = %kind, rows = table.rows.len(), dry_run = options.dry_run, "import started");

    let mut staged = Vec::new();
    let mut outcomes = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let key = row.get(kind.key_column()).trim().to_string();

        let outcome = match importer.import_row(row, &mut cache) {
            Ok(RowDisposition::Created(entity)) => {
                let id = entity.created_id();
                let key = entity.natural_key().to_string();
                staged.push(entity);
                RowOutcome::success(row.number, key, id, format!("{} created successfully", kind.noun()))
            }
            Ok(RowDisposition::Duplicate(reason)) => RowOutcome::skipped(row.number, key, reason),
            Err(e) => RowOutcome::error(row.number, key, format!("Line {}: {}", row.number, e)),
        };

        tracing::debug!(
            row = outcome.row_number,
            key = %outcome.key,
            status = outcome.status(),
            detail = outcome.message(),
            "row processed"
        );
        outcomes.push(outcome);
    }

    let result = summarize(kind, outcomes);
    let staged_count = staged.len();

    if options.dry_run {
        tracing::info!(kind = %kind, staged = staged_count, "dry run, nothing committed");
        return Ok(BatchRun {
            result,
            committed: false,
            staged: staged_count,
        });
    }

    if !staged.is_empty() {
        store.commit(&staged).map_err(|source| {
            tracing::warn!(kind = %kind, staged = staged_count, error = %source, "commit failed, batch rolled back");
            ImportError::CommitFailed {
                kind,
                staged: staged_count,
                source,
            }
        })?;
    }

    tracing::info!(
        kind = %kind,
        total = result.total_rows,
        successful = result.successful,
        failed = result.failed,
        skipped = result.skipped,
        "import committed"
    );

    Ok(BatchRun {
        result,
        committed: true,
        staged: staged_count,
    })
}
