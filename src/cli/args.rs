//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    import::ImportArgs, init::InitArgs, logs::LogsCommands, reference::RefCommands,
    template::TemplateArgs,
};

#[derive(Parser)]
#[command(name = "csimport")]
#[command(author, version, about = "CollabSphere bulk import")]
#[command(long_about = "Load subjects, academic classes and user accounts from CSV or Excel files into a CollabSphere store, with a per-row report and an import log.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .csimport/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Run as this account instead of the configured operator
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub as_user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new import workspace
    Init(InitArgs),

    /// Import subjects, classes or users from a CSV/Excel file
    Import(ImportArgs),

    /// Write the CSV template for an entity type
    Template(TemplateArgs),

    /// Import log history
    #[command(subcommand)]
    Logs(LogsCommands),

    /// Reference data (departments, semesters)
    #[command(subcommand)]
    Ref(RefCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Styled terminal output (tables for lists, yaml for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
}
