use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use rcl_cli::pipeline::{dependency_counts, solve_table};
use rcl_cli::summary::{dependency_table, functions_table, solved_table, statuses_table};
use rcl_cli::workbook::Workbook;
use rcl_formula::FormulaConfig;

use crate::cli::{DepsArgs, SolveArgs};

fn load_config(path: Option<&Path>) -> Result<FormulaConfig> {
    match path {
        Some(path) => FormulaConfig::load(path).context("load formula config"),
        None => Ok(FormulaConfig::default()),
    }
}

pub fn run_solve(args: &SolveArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let workbook = Workbook::load(&args.workbook)?;
    let rows = solve_table(&workbook, &config, &args.table, &args.header, args.row)?;
    info!(table = %args.table, rows = rows.len(), "solve finished");
    println!("{}", solved_table(&rows));
    Ok(())
}

pub fn run_deps(args: &DepsArgs) -> Result<()> {
    let workbook = Workbook::load(&args.workbook)?;
    let counts = dependency_counts(&workbook, &args.table, &args.header)?;
    println!("{}", dependency_table(&counts));
    Ok(())
}

pub fn run_functions() {
    println!("{}", functions_table());
}

pub fn run_statuses() {
    println!("{}", statuses_table());
}
