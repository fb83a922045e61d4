//! Entry point used by the CLI: permission check, parse, import, log

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::identity::{EntityKind, UserId};
use crate::core::store::{ImportLogSink, ImportStore, UserSummary};
use crate::entities::RoleName;

use super::orchestrator::{run_import, ImportOptions};
use super::parser::parse;
use super::report::{record, BatchResult, LogSource};
use super::ImportError;

/// An authenticated caller and the permission decision made for them
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: UserId,
    /// Shown in messages (usually the email)
    pub display: String,
    pub can_import: bool,
}

impl Caller {
    /// Active ADMIN and STAFF accounts may import
    pub fn from_user(user: &UserSummary) -> Self {
        let can_import = user.is_active
            && user
                .role_name
                .parse::<RoleName>()
                .map(|role| role.can_import())
                .unwrap_or(false);

        Self {
            identity: user.user_id,
            display: user.email.clone(),
            can_import,
        }
    }
}

/// One uploaded file
#[derive(Debug, Clone)]
pub struct ImportRequest<'a> {
    pub kind: EntityKind,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
    pub options: ImportOptions,
    /// Write an import log after a successful commit
    pub record_log: bool,
}

/// What the caller gets back
#[derive(Debug, Serialize)]
pub struct ImportReport {
    #[serde(flatten)]
    pub result: BatchResult,
    pub committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<i64>,
    pub file_hash: String,
}

/// SHA-256 of the uploaded bytes, hex encoded
pub fn compute_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Import one file on behalf of `caller`
pub fn import_file<S>(
    store: &mut S,
    caller: &Caller,
    request: &ImportRequest<'_>,
) -> Result<ImportReport, ImportError>
where
    S: ImportStore + ImportLogSink,
{
    if !caller.can_import {
        return Err(ImportError::Forbidden {
            caller: caller.display.clone(),
        });
    }

    let table = parse(request.bytes, request.file_name)?;
    let file_hash = compute_hash(request.bytes);

    tracing::info!(
        caller = %caller.display,
        file = request.file_name,
        hash = %file_hash,
        "processing upload"
    );

    let run = run_import(store, request.kind, &table, request.options)?;

    let log_id = if request.record_log {
        let source = LogSource {
            file_name: Some(request.file_name.to_string()),
            file_hash: Some(file_hash.clone()),
        };
        record(store, &caller.identity, &run, &source)
    } else {
        None
    };

    Ok(ImportReport {
        result: run.result,
        committed: run.committed,
        log_id,
        file_hash,
    })
}
