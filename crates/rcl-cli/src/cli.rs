//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use rcl_model::RowId;
use rcl_model::headers::DEFAULT_VALUE;

#[derive(Parser)]
#[command(
    name = "rcl",
    version,
    about = "Reporting client formula engine",
    long_about = "Solve the column formulas of workbook tables and inspect the\n\
                  function registry and report statuses of the reporting client."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Formula settings (boolean words, keywords, traced column).
    #[arg(long = "config", value_name = "FORMULA_TOML", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Solve the formulas of a table and print the written values.
    Solve(SolveArgs),

    /// Print how many sibling formulas each column formula depends on.
    Deps(DepsArgs),

    /// List the formula functions.
    Functions,

    /// List report statuses and what each one allows.
    Statuses,
}

#[derive(Parser)]
pub struct SolveArgs {
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    /// Table (sheet name) to solve.
    #[arg(long = "table")]
    pub table: String,

    /// Field header whose formulas are solved.
    #[arg(long = "header", default_value = DEFAULT_VALUE)]
    pub header: String,

    /// Solve only this row.
    #[arg(long = "row", value_name = "ID")]
    pub row: Option<RowId>,
}

#[derive(Parser)]
pub struct DepsArgs {
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    #[arg(long = "table")]
    pub table: String,

    #[arg(long = "header", default_value = DEFAULT_VALUE)]
    pub header: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Log format: pretty for people, json for machines.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
