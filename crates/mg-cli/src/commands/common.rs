//! Shared utilities for CLI commands

use anyhow::Result;
use mg_core::{Config, DbType, LedgerTable};
use mg_db::DuckDbBackend;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main turns it into the process status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Script load or configuration problem
pub(crate) const EXIT_LOAD: i32 = 2;
/// Ledger table missing, drifted, unreadable, or not creatable
pub(crate) const EXIT_LEDGER_SCHEMA: i32 = 3;
/// A script committed but its ledger row was not written
pub(crate) const EXIT_LEDGER_WRITE: i32 = 4;

/// Report `err` to the operator and turn it into an exit code.
pub(crate) fn fail(code: i32, err: impl fmt::Display) -> anyhow::Error {
    eprintln!("Error: {}", err);
    ExitCode(code).into()
}

/// Configuration for one invocation: the config file with CLI overrides applied
#[derive(Debug)]
pub(crate) struct Settings {
    /// Directory holding the migration scripts
    pub folder: PathBuf,
    /// Database file path or `:memory:`
    pub database: String,
    pub config: Config,
}

/// Build [`Settings`] from the config file and the global flags.
///
/// Every failure here is a load error.
pub(crate) fn resolve_settings(global: &GlobalArgs) -> Result<Settings> {
    let folder = PathBuf::from(&global.folder);

    let loaded = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir_or_default(&folder),
    };
    let mut config = loaded.map_err(|e| fail(EXIT_LOAD, e))?;

    if let Some(table) = &global.table {
        config.ledger_table = LedgerTable::try_new(table.as_str()).ok_or_else(|| {
            fail(
                EXIT_LOAD,
                format!(
                    "Invalid ledger table name '{}': expected `table` or `schema.table`",
                    table
                ),
            )
        })?;
    }

    let database = match global.database.as_ref().or(config.database.path.as_ref()) {
        Some(path) => path.clone(),
        None => {
            return Err(fail(
                EXIT_LOAD,
                "No database given. Pass --database or set database.path in migrant.yml",
            ))
        }
    };

    log::debug!(
        "folder={} database={} ledger_table={} extensions={:?}",
        folder.display(),
        database,
        config.ledger_table,
        config.extensions
    );

    Ok(Settings {
        folder,
        database,
        config,
    })
}

/// Open the configured database
pub(crate) fn open_database(settings: &Settings) -> Result<DuckDbBackend> {
    match settings.config.database.db_type {
        DbType::DuckDb => DuckDbBackend::new(&settings.database).map_err(|e| fail(EXIT_LOAD, e)),
    }
}
