//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::ledger::{APPLIED_AT_COLUMN, DATABASE_NAME_COLUMN, IDENTITY_COLUMN, LEDGER_ID_COLUMN};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use mg_core::sql_utils::{quote_qualified, split_qualified_name};
use mg_core::LedgerTable;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", e, path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn transaction_control(&self, statement: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(statement)
            .map_err(|e| DbError::TransactionError(format!("{statement}: {e}")))
    }

    fn query_strings_sync(&self, sql: &str) -> DbResult<Vec<DbResult<String>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get::<_, String>(0).map_err(DbError::from));
        }
        Ok(values)
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified_name(name);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn column_names_sync(&self, name: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified_name(name);
        let mut stmt = conn.prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )?;
        let columns = stmt
            .query_map(duckdb::params![schema, table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<Option<usize>> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        // DuckDB's multi-statement interface reports no row counts.
        Ok(None)
    }

    async fn execute_with_params(&self, sql: &str, params: &[Option<String>]) -> DbResult<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(sql, duckdb::params_from_iter(params.iter()))?;
        Ok(changed)
    }

    async fn query_strings(&self, sql: &str) -> DbResult<Vec<DbResult<String>>> {
        self.query_strings_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn column_names(&self, name: &str) -> DbResult<Vec<String>> {
        self.column_names_sync(name)
    }

    async fn current_database(&self) -> DbResult<String> {
        let conn = self.lock()?;
        let name: String = conn.query_row("SELECT current_database()", [], |row| row.get(0))?;
        Ok(name)
    }

    async fn begin(&self) -> DbResult<()> {
        self.transaction_control("BEGIN TRANSACTION")
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK")
    }

    fn ledger_ddl(&self, table: &LedgerTable) -> String {
        format!(
            "CREATE TABLE {table} (\n    \
             {LEDGER_ID_COLUMN} UUID PRIMARY KEY DEFAULT gen_random_uuid(),\n    \
             {IDENTITY_COLUMN} VARCHAR(100) NOT NULL UNIQUE,\n    \
             {APPLIED_AT_COLUMN} TIMESTAMP NOT NULL,\n    \
             {DATABASE_NAME_COLUMN} VARCHAR(50)\n)",
            table = quote_qualified(table.as_str()),
        )
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
