//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Migrant - applies ordered SQL migration scripts exactly once
#[derive(Parser, Debug)]
#[command(name = "migrant")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the migration scripts
    #[arg(short, long, global = true, default_value = ".")]
    pub folder: String,

    /// Database file path, or `:memory:` (overrides the config file)
    #[arg(short, long, global = true, env = "MIGRANT_DATABASE")]
    pub database: Option<String>,

    /// Ledger table name, optionally schema-qualified (overrides the config file)
    #[arg(short, long, global = true)]
    pub table: Option<String>,

    /// Config file path (default: migrant.yml in the scripts folder)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the ledger table, then exit
    Init,

    /// Apply pending migration scripts
    Run(RunArgs),

    /// List pending migration scripts without applying them
    Ls(LsArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip scripts whose order prefix is below this number
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub start_at: i64,

    /// Skip scripts whose order prefix is at or above this number (0 = no limit)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub stop_at: i64,

    /// Apply every pending script without asking
    #[arg(long)]
    pub no_prompt: bool,

    /// Keep going after a failed script (the run still exits non-zero)
    #[arg(long)]
    pub continue_on_error: bool,

    /// Execute every script, then roll back instead of committing
    #[arg(long)]
    pub fake: bool,

    /// Do not write applied scripts to the ledger table
    #[arg(long)]
    pub no_record: bool,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Skip scripts whose order prefix is below this number
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub start_at: i64,

    /// Skip scripts whose order prefix is at or above this number (0 = no limit)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub stop_at: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output formats for listing
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Table,
    /// Every script in range with its state, as JSON
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
