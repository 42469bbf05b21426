use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Migrate locker administration SQL dumps to JSON",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert the INSERT statements of a dump into JSON files
    Migrate(MigrateArgs),
    /// Summarize the tables, columns, and row counts found in a dump
    Inspect(InspectArgs),
    /// Check migrated lockers against the locker API schema
    Validate(ValidateArgs),
    /// Print or save the built-in locker migration plan as YAML
    Plan(PlanArgs),
    /// Read or edit a flat-file JSON store
    Store(StoreArgs),
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// SQL dump to migrate
    pub dump: PathBuf,
    /// Pretty-print the JSON output with a four-space indent
    #[arg(long)]
    pub format: bool,
    /// Output directory (defaults to the current directory, or next to the
    /// dump with --combined)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Write a single JSON object next to the dump instead of per-table files
    #[arg(long, conflicts_with = "keyed")]
    pub combined: bool,
    /// Write each table as an object keyed by row id
    #[arg(long)]
    pub keyed: bool,
    /// YAML migration plan replacing the built-in locker plan
    #[arg(short = 'p', long, conflicts_with = "raw")]
    pub plan: Option<PathBuf>,
    /// Skip renames and reference resolution entirely
    #[arg(long)]
    pub raw: bool,
    /// Character encoding of the dump (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// SQL dump to inspect
    pub dump: PathBuf,
    /// Character encoding of the dump (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Migrated lockers file (array or id-keyed object)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Destination file; the plan is printed to stdout when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    /// JSON store file; created empty when it does not exist
    pub file: PathBuf,
    /// Create a missing store as an array of rows instead of an object
    #[arg(long)]
    pub array: bool,
    #[command(subcommand)]
    pub action: StoreAction,
}

#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// List keys, optionally only those with a given prefix
    List {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print the value stored under a key
    Get { key: String },
    /// Remove one or more keys
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}
