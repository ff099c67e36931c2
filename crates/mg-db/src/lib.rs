//! mg-db - Database access for migrant
//!
//! The `Database` trait, the DuckDB backend, the applied-script ledger and
//! the transactional script executor.

pub mod duckdb;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{ApplyError, DbError, DbResult, LedgerError, LedgerResult};
pub use executor::{Application, Disposition, ExecutionOutcome, ScriptExecutor};
pub use ledger::{AppliedSet, Ledger, LedgerRecord};
pub use traits::Database;
