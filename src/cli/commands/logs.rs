//! `csimport logs` command - Import log history of the operator

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, open_workspace, resolve_operator, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::{ImportLogEntry, StoreError};

#[derive(Subcommand, Debug)]
pub enum LogsCommands {
    /// List your import logs, newest first
    List {
        /// Show at most this many entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show one import log with its per-row details
    Show {
        /// Log ID
        id: i64,
    },

    /// Delete one of your import logs
    Delete {
        /// Log ID
        id: i64,
    },
}

pub fn run(cmd: LogsCommands, global: &GlobalOpts) -> Result<()> {
    let mut ws = open_workspace(global)?;
    let caller = resolve_operator(&ws, global)?;
    let format = effective_format(global, &ws.config);

    match cmd {
        LogsCommands::List { limit } => {
            let mut logs = ws.store.list_import_logs(&caller.identity).into_diagnostic()?;
            if let Some(limit) = limit {
                logs.truncate(limit);
            }
            print_list(&logs, format, global.quiet)
        }
        LogsCommands::Show { id } => {
            let log = ws
                .store
                .get_import_log(id)
                .into_diagnostic()?
                .filter(|log| log.user_id == caller.identity.to_string())
                .ok_or_else(|| miette::miette!("import log {} not found", id))?;

            match format {
                OutputFormat::Json | OutputFormat::Tsv => {
                    println!("{}", serde_json::to_string_pretty(&log).into_diagnostic()?)
                }
                OutputFormat::Yaml | OutputFormat::Auto => {
                    print!("{}", serde_yml::to_string(&log).into_diagnostic()?)
                }
            }
            Ok(())
        }
        LogsCommands::Delete { id } => {
            match ws.store.delete_import_log(id, &caller.identity) {
                Ok(()) => {}
                Err(StoreError::NotFound(_)) => {
                    return Err(miette::miette!(
                        help = "only the account that ran an import can delete its log",
                        "import log {} not found",
                        id
                    ));
                }
                Err(e) => return Err(e).into_diagnostic(),
            }
            if !global.quiet {
                println!("{} Deleted import log {}", style("✓").green(), style(id).cyan());
            }
            Ok(())
        }
    }
}

fn print_list(logs: &[ImportLogEntry], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&logs).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&logs).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            println!("ID\tTYPE\tTOTAL\tOK\tFAILED\tSKIPPED\tFILE\tCREATED");
            for log in logs {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    log.log_id,
                    log.import_type,
                    log.total_rows,
                    log.successful,
                    log.failed,
                    log.skipped,
                    log.source_file.as_deref().unwrap_or(""),
                    log.created_at.to_rfc3339()
                );
            }
        }
        OutputFormat::Auto => {
            if logs.is_empty() {
                if !quiet {
                    println!("{}", style("No import logs yet.").dim());
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["ID", "Type", "Total", "OK", "Failed", "Skipped", "File", "Created"]);
            for log in logs {
                builder.push_record([
                    log.log_id.to_string(),
                    log.import_type.clone(),
                    log.total_rows.to_string(),
                    log.successful.to_string(),
                    log.failed.to_string(),
                    log.skipped.to_string(),
                    truncate_str(log.source_file.as_deref().unwrap_or("-"), 30),
                    log.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::sharp()));
        }
    }
    Ok(())
}
