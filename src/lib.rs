pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod io_utils;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod remap;
pub mod resolve;
pub mod sql;
pub mod store;
pub mod table;
pub mod tables;
pub mod validate;
pub mod yaml_provider;

use std::{env, fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde_json::Value;

use crate::{
    cli::{Cli, Commands, StoreAction},
    output::JsonStyle,
    plan::MigrationPlan,
    store::JsonStore,
};

pub use crate::{
    error::MigrationError,
    pipeline::{Migration, migrate, parse_dump},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("locker_migrate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate(args) => handle_migrate(&args),
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Validate(args) => handle_validate(&args),
        Commands::Plan(args) => handle_plan(&args),
        Commands::Store(args) => handle_store(args),
    }
}

fn handle_migrate(args: &cli::MigrateArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let plan = if args.raw {
        MigrationPlan::empty()
    } else if let Some(path) = &args.plan {
        MigrationPlan::load(path)?
    } else {
        MigrationPlan::locker_default()
    };
    info!(
        "Migrating '{}' with {} rename table(s) and {} link(s)",
        args.dump.display(),
        plan.renames.len(),
        plan.links.len()
    );

    let dump = io_utils::read_dump(&args.dump, encoding)?;
    let migration = pipeline::migrate(&dump, &plan)?;
    if migration.tables.is_empty() {
        info!("No INSERT statements found in '{}'", args.dump.display());
    }

    let style = JsonStyle::from_flag(args.format);
    let written = if args.combined {
        let target = output::combined_output_path(&args.dump)?;
        let target = match &args.output_dir {
            Some(dir) => {
                ensure_dir(dir)?;
                dir.join(target.file_name().unwrap_or_default())
            }
            None => target,
        };
        vec![output::write_combined(&migration.tables, &target, style)?]
    } else {
        let dir = args.output_dir.as_deref().unwrap_or(Path::new("."));
        ensure_dir(dir)?;
        if args.keyed {
            output::write_keyed(&migration.tables, dir, style)?
        } else {
            output::write_table_files(&migration.tables, dir, style)?
        }
    };

    let suffix = if style == JsonStyle::Pretty {
        " (formatted)"
    } else {
        ""
    };
    for path in &written {
        println!("Wrote {}{suffix}", path.display());
    }
    if !migration.diagnostics.is_empty() {
        info!(
            "Migration finished with {} warning(s)",
            migration.diagnostics.len()
        );
    }
    Ok(())
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dump = io_utils::read_dump(&args.dump, encoding)?;
    let tables = pipeline::parse_dump(&dump)?;
    print!("{}", table::render_summary(&tables));
    Ok(())
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Reading lockers from {:?}", args.input))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing lockers from {:?}", args.input))?;
    let total = match &document {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    };
    let issues = validate::validate_lockers(&document)?;
    for failure in &issues {
        println!("{}: {}", failure.record, failure.issue);
    }
    if !issues.is_empty() {
        bail!(
            "{} of {total} locker record(s) failed validation",
            issues.len()
        );
    }
    println!("All {total} locker record(s) are valid");
    Ok(())
}

fn handle_plan(args: &cli::PlanArgs) -> Result<()> {
    let plan = MigrationPlan::locker_default();
    match &args.output {
        Some(path) => {
            plan.save(path)
                .with_context(|| format!("Writing migration plan to {path:?}"))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", yaml_provider::to_string(&plan)?),
    }
    Ok(())
}

fn handle_store(args: cli::StoreArgs) -> Result<()> {
    let initial = if args.array {
        Value::Array(Vec::new())
    } else {
        Value::Object(serde_json::Map::new())
    };
    let store = JsonStore::open_with(&args.file, initial)?;
    debug!("Opened store {:?}", store.path());
    match args.action {
        StoreAction::List { prefix } => {
            for key in store.list(prefix.as_deref())? {
                println!("{key}");
            }
        }
        StoreAction::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", output::to_json_string(&value, JsonStyle::Pretty)?),
            None => bail!("Key '{key}' not found in {:?}", args.file),
        },
        StoreAction::Delete { keys } => {
            let removed = store.delete_many(&keys)?;
            println!("Removed {removed} of {} key(s)", keys.len());
        }
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))
}
