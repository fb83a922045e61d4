//! `csimport import` command - Import entities from a CSV or Excel file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{effective_format, escape_tsv, open_workspace, resolve_operator, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityKind;
use crate::import::{import_file, ImportOptions, ImportReport, ImportRequest, OutcomeKind};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Entity type to import (subjects, classes, users)
    pub kind: EntityKind,

    /// File to import (.csv, .xlsx or .xls)
    pub file: PathBuf,

    /// Validate every row without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not write an import log for this run
    #[arg(long)]
    pub no_log: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let mut ws = open_workspace(global)?;
    let caller = resolve_operator(&ws, global)?;
    let format = effective_format(global, &ws.config);

    let bytes = std::fs::read(&args.file).into_diagnostic()?;
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    let human = format == OutputFormat::Auto;
    if human && !global.quiet {
        println!(
            "{} Importing {} from {} as {}{}",
            style("→").blue(),
            style(args.kind).cyan(),
            style(args.file.display()).yellow(),
            style(&caller.display).cyan(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
        println!();
    }

    let request = ImportRequest {
        kind: args.kind,
        file_name: &file_name,
        bytes: &bytes,
        options: ImportOptions {
            dry_run: args.dry_run,
        },
        record_log: !args.no_log && ws.config.record_logs(),
    };
    let report = import_file(&mut ws.store, &caller, &request)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        OutputFormat::Tsv => print_tsv(&report),
        OutputFormat::Auto => print_human(&report, global.quiet),
    }

    Ok(())
}

fn print_tsv(report: &ImportReport) {
    println!("ROW\tSTATUS\tKEY\tID\tMESSAGE");
    for row in &report.result.results {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.row_number,
            row.status(),
            escape_tsv(&row.key),
            row.created_id().map(|id| id.to_string()).unwrap_or_default(),
            escape_tsv(row.message())
        );
    }
}

fn print_human(report: &ImportReport, quiet: bool) {
    let result = &report.result;

    if !quiet {
        for row in &result.results {
            let key = style(truncate_str(&row.key, 30)).cyan();
            match &row.kind {
                OutcomeKind::Success { created_id, message } => println!(
                    "{} Row {}: {} {} ({})",
                    style("✓").green(),
                    row.row_number,
                    key,
                    message,
                    style(created_id).dim()
                ),
                OutcomeKind::Skipped { reason } => println!(
                    "{} Row {}: {} {}",
                    style("○").dim(),
                    row.row_number,
                    key,
                    style(reason).dim()
                ),
                OutcomeKind::Error { message } => eprintln!(
                    "{} Row {}: {} {}",
                    style("✗").red(),
                    row.row_number,
                    key,
                    style(message).red()
                ),
            }
        }
        println!();
    }

    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(result.total_rows).cyan());
    println!("  Created:          {}", style(result.successful).green());
    if result.failed > 0 {
        println!("  Errors:           {}", style(result.failed).red());
    }
    if result.skipped > 0 {
        println!("  Skipped:          {}", style(result.skipped).dim());
    }
    if let Some(log_id) = report.log_id {
        println!("  Import log:       {}", style(log_id).cyan());
    }

    if !report.committed {
        println!();
        println!(
            "{}",
            style("Dry run complete. Nothing was written.").yellow()
        );
    }
}
