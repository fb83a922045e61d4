//! `csimport ref` command - Minimal reference data seeding

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, open_workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::StoreError;

#[derive(Subcommand, Debug)]
pub enum RefCommands {
    /// Add a department
    Dept {
        /// Department name, exactly as it will appear in import files
        name: String,
    },

    /// Add a semester
    Semester {
        /// Semester code, exactly as it will appear in import files
        code: String,

        /// Display name (defaults to the code)
        #[arg(long)]
        name: Option<String>,
    },

    /// List departments and semesters
    List,
}

pub fn run(cmd: RefCommands, global: &GlobalOpts) -> Result<()> {
    let mut ws = open_workspace(global)?;

    match cmd {
        RefCommands::Dept { name } => {
            let name = name.trim();
            let id = ws
                .store
                .add_department(name)
                .map_err(|e| already_exists(e, "department", name))?;
            if !global.quiet {
                println!(
                    "{} Added department {} (id {})",
                    style("✓").green(),
                    style(name).cyan(),
                    id
                );
            }
        }
        RefCommands::Semester { code, name } => {
            let code = code.trim();
            let display = name.as_deref().unwrap_or(code);
            let id = ws
                .store
                .add_semester(code, display)
                .map_err(|e| already_exists(e, "semester", code))?;
            if !global.quiet {
                println!(
                    "{} Added semester {} (id {})",
                    style("✓").green(),
                    style(code).cyan(),
                    id
                );
            }
        }
        RefCommands::List => {
            let departments = ws.store.list_departments().into_diagnostic()?;
            let semesters = ws.store.list_semesters().into_diagnostic()?;

            match effective_format(global, &ws.config) {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "departments": departments,
                        "semesters": semesters,
                    });
                    println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
                }
                OutputFormat::Yaml => {
                    let value = serde_json::json!({
                        "departments": departments,
                        "semesters": semesters,
                    });
                    print!("{}", serde_yml::to_string(&value).into_diagnostic()?);
                }
                OutputFormat::Tsv => {
                    println!("KIND\tID\tKEY\tNAME");
                    for d in &departments {
                        println!("department\t{}\t{}\t{}", d.dept_id, d.dept_name, d.dept_name);
                    }
                    for s in &semesters {
                        println!(
                            "semester\t{}\t{}\t{}",
                            s.semester_id, s.semester_code, s.semester_name
                        );
                    }
                }
                OutputFormat::Auto => {
                    let mut builder = Builder::default();
                    builder.push_record(["Kind", "ID", "Key", "Name"]);
                    for d in &departments {
                        builder.push_record([
                            "department".to_string(),
                            d.dept_id.to_string(),
                            d.dept_name.clone(),
                            d.dept_name.clone(),
                        ]);
                    }
                    for s in &semesters {
                        builder.push_record([
                            "semester".to_string(),
                            s.semester_id.to_string(),
                            s.semester_code.clone(),
                            s.semester_name.clone(),
                        ]);
                    }
                    println!("{}", builder.build().with(Style::sharp()));
                }
            }
        }
    }

    Ok(())
}

fn already_exists(err: StoreError, what: &str, key: &str) -> miette::Report {
    match err {
        StoreError::Constraint(_) => miette::miette!("{} '{}' already exists", what, key),
        other => miette::miette!("{}", other),
    }
}
