//! Shared helper functions for CLI commands

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::SqliteStore;
use crate::core::{Config, Project};
use crate::import::Caller;

/// An opened workspace: root, merged config and store
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: SqliteStore,
}

/// Locate the workspace (from --project or the current directory) and open its store
pub fn open_workspace(global: &GlobalOpts) -> Result<Workspace> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let config = Config::load_for(Some(&project));
    let db_path = config.database_path(&project);
    tracing::debug!(path = %db_path.display(), "opening store");
    let store = SqliteStore::open(&db_path).into_diagnostic()?;

    Ok(Workspace {
        project,
        config,
        store,
    })
}

/// Resolve the acting account: --as first, then the configured operator
pub fn resolve_operator(ws: &Workspace, global: &GlobalOpts) -> Result<Caller> {
    let email = global
        .as_user
        .as_deref()
        .or_else(|| ws.config.operator())
        .ok_or_else(|| {
            miette::miette!(
                help = "pass --as EMAIL, set CSIMPORT_OPERATOR, or add `operator:` to .csimport/config.yaml",
                "no operator configured"
            )
        })?;

    let user = ws
        .store
        .find_user_by_email(email)
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("operator '{}' not found in store", email))?;

    Ok(Caller::from_user(&user))
}

/// Output format after applying the configured default
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Make a value safe for a TSV cell
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}
