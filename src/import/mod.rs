//! Bulk import engine
//!
//! Pipeline for one uploaded file and one entity kind:
//!
//! 1. [`parser`] turns bytes into a [`ParsedTable`]
//! 2. [`orchestrator::run_import`] checks columns, builds the
//!    [`ReferenceCache`], runs every row through the kind's
//!    [`importer::RowImporter`] and commits the staged entities once
//! 3. [`report`] folds row outcomes into a [`BatchResult`] and records the
//!    import log after a successful commit
//!
//! [`service::import_file`] wires the steps together for a caller.

pub mod cache;
pub mod importer;
pub mod orchestrator;
pub mod parser;
pub mod report;
pub mod service;
pub mod template;

pub use cache::ReferenceCache;
pub use orchestrator::{run_import, BatchRun, ImportOptions};
pub use parser::{parse, ParseError, ParsedTable, RowRecord};
pub use report::{BatchResult, OutcomeKind, RowOutcome};
pub use service::{import_file, Caller, ImportReport, ImportRequest};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::EntityKind;
use crate::core::store::StoreError;

/// Batch-level failures (row problems are reported per row instead)
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("{caller} is not allowed to import data")]
    #[diagnostic(
        code(csimport::import::forbidden),
        help("only ADMIN and STAFF accounts can run imports")
    )]
    Forbidden { caller: String },

    #[error(transparent)]
    #[diagnostic(
        code(csimport::import::parse),
        help("upload a .csv, .xlsx or .xls file with a header row and at least one data row")
    )]
    Parse(#[from] ParseError),

    #[error("missing required columns for {kind} import: {}", .columns.join(", "))]
    #[diagnostic(
        code(csimport::import::missing_columns),
        help("download a template with `csimport template <type>` for the expected header row")
    )]
    MissingColumns { kind: EntityKind, columns: Vec<String> },

    #[error("{0}")]
    #[diagnostic(
        code(csimport::import::configuration),
        help("seed the reference data first (`csimport init`, `csimport ref`)")
    )]
    Configuration(String),

    #[error(transparent)]
    #[diagnostic(code(csimport::import::store))]
    Store(#[from] StoreError),

    #[error("commit of {staged} staged {kind} failed; nothing was imported")]
    #[diagnostic(
        code(csimport::import::commit_failed),
        help("another import may have created the same records; re-run the file to see which rows are now duplicates")
    )]
    CommitFailed {
        kind: EntityKind,
        staged: usize,
        #[source]
        source: StoreError,
    },

    #[error("no template available for {0}")]
    #[diagnostic(code(csimport::import::template))]
    TemplateMissing(EntityKind),
}
