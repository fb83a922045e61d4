//! `csimport template` command - Write an import template

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::cli::helpers::{open_workspace, resolve_operator};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityKind;
use crate::import::{template, ImportError};

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Entity type (subjects, classes, users)
    pub kind: EntityKind,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: TemplateArgs, global: &GlobalOpts) -> Result<()> {
    // Same gate as `csimport import`
    let ws = open_workspace(global)?;
    let caller = resolve_operator(&ws, global)?;
    if !caller.can_import {
        return Err(ImportError::Forbidden {
            caller: caller.display,
        }
        .into());
    }

    let bytes = template::download(args.kind)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} template to {}",
                    style("✓").green(),
                    style(args.kind).cyan(),
                    style(path.display()).yellow()
                );
            }
        }
        None => {
            std::io::stdout().write_all(&bytes).into_diagnostic()?;
            if !global.quiet {
                eprintln!();
                eprintln!(
                    "{} Template generated. Redirect to file: csimport template {} > {}",
                    style("→").blue(),
                    args.kind,
                    template::file_name(args.kind)
                );
            }
        }
    }

    Ok(())
}
