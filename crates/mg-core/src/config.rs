//! Configuration types and parsing for migrant.yml
//!
//! The file is optional: every key has a default and the CLI can override
//! the database path and ledger table. The resolved [`Config`] and
//! [`RunOptions`] are built once per invocation and passed by reference.

use crate::error::{CoreError, CoreResult};
use crate::names::LedgerTable;
use crate::repository::ScriptRange;
use crate::splitter::DEFAULT_BATCH_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ledger table name used when neither the config file nor the CLI sets one.
pub const DEFAULT_LEDGER_TABLE: &str = "migrant_version";

/// File names checked, in order, when looking for a config file in a directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["migrant.yml", "migrant.yaml"];

/// Project configuration from migrant.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table recording applied scripts
    #[serde(default)]
    pub ledger_table: LedgerTable,

    /// File extensions (without the dot) treated as migration scripts
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Line that separates batches inside a script
    #[serde(default = "default_batch_separator")]
    pub batch_separator: String,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (embedded, file-backed or in-memory)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or `:memory:`
    #[serde(default)]
    pub path: Option<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["sql".to_string(), "txt".to_string()]
}

fn default_batch_separator() -> String {
    DEFAULT_BATCH_SEPARATOR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            ledger_table: LedgerTable::default(),
            extensions: default_extensions(),
            batch_separator: default_batch_separator(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Locate a config file in `dir`, trying each of [`CONFIG_FILE_NAMES`].
    pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load the config file found in `dir`, or fall back to defaults.
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Accept extensions written as `.sql` as well as `sql`.
    fn normalize(&mut self) {
        for ext in &mut self.extensions {
            if let Some(stripped) = ext.strip_prefix('.') {
                *ext = stripped.to_string();
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.extensions.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one script extension must be listed in 'extensions'"
                    .to_string(),
            });
        }
        if self.extensions.iter().any(|e| e.is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "Empty entry in 'extensions'".to_string(),
            });
        }

        let separator = self.batch_separator.trim();
        if separator.is_empty() || separator.contains('\n') {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "'batch_separator' must be a single non-blank line, got {:?}",
                    self.batch_separator
                ),
            });
        }

        Ok(())
    }
}

/// Per-run switches consumed by the run controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Order-key window of scripts considered by this run
    pub range: ScriptRange,

    /// Apply without asking the operator
    pub no_prompt: bool,

    /// Record failures and move on instead of stopping
    pub continue_on_error: bool,

    /// Only list pending scripts
    pub list_only: bool,

    /// Execute every script but always roll back
    pub fake: bool,

    /// Never write to the ledger table
    pub skip_ledger_write: bool,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
