//! mg-core - Core library for Migrant
//!
//! This crate provides script discovery, batch splitting, configuration
//! parsing, and the name types shared by the database layer and the CLI.
//! Nothing here touches a database.

pub mod config;
pub mod error;
pub mod names;
mod newtype_string;
pub mod repository;
pub mod splitter;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, DbType, RunOptions};
pub use error::{CoreError, CoreResult};
pub use names::{LedgerTable, ScriptIdentity};
pub use repository::{load_scripts, MigrationScript, ScriptRange};
pub use splitter::split_batches;
