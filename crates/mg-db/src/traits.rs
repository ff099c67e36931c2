//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use mg_core::LedgerTable;

/// Database abstraction used by the ledger and the script executor.
///
/// A backend wraps exactly one connection. Transaction control is explicit
/// (`begin` / `commit` / `rollback`) and callers keep at most one
/// transaction open at a time.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one or more statements. Returns the affected row count when
    /// the backend can report it.
    async fn execute_batch(&self, sql: &str) -> DbResult<Option<usize>>;

    /// Execute a single statement with positional text parameters
    async fn execute_with_params(&self, sql: &str, params: &[Option<String>]) -> DbResult<usize>;

    /// Run a query and read its first column as text, row by row.
    ///
    /// The outer error covers the query itself; an inner error means that
    /// single row could not be read.
    async fn query_strings(&self, sql: &str) -> DbResult<Vec<DbResult<String>>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Column names of a table, in declaration order
    async fn column_names(&self, name: &str) -> DbResult<Vec<String>>;

    /// Name of the database the connection is attached to
    async fn current_database(&self) -> DbResult<String>;

    /// Open a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// DDL creating the ledger table in this backend's dialect.
    ///
    /// Must fail when the table already exists (no `IF NOT EXISTS`).
    fn ledger_ddl(&self, table: &LedgerTable) -> String;
}
