//! Ledger of applied migration scripts.
//!
//! One row per script that committed successfully. The table is created
//! explicitly with [`Ledger::bootstrap`] and checked with
//! [`Ledger::verify_schema`] before any other ledger access.

use crate::error::{DbError, LedgerError, LedgerResult};
use crate::traits::Database;
use chrono::{NaiveDateTime, Utc};
use mg_core::sql_utils::quote_qualified;
use mg_core::{LedgerTable, ScriptIdentity};
use std::collections::HashSet;

/// Surrogate key column
pub const LEDGER_ID_COLUMN: &str = "ledger_id";
/// Script identity column (unique)
pub const IDENTITY_COLUMN: &str = "script_name";
/// Commit timestamp column
pub const APPLIED_AT_COLUMN: &str = "applied_at";
/// Database the script was applied to
pub const DATABASE_NAME_COLUMN: &str = "database_name";

/// Columns a well-formed ledger table has, in any order.
pub const EXPECTED_COLUMNS: [&str; 4] = [
    LEDGER_ID_COLUMN,
    IDENTITY_COLUMN,
    APPLIED_AT_COLUMN,
    DATABASE_NAME_COLUMN,
];

/// A row written by [`Ledger::record_applied`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub identity: ScriptIdentity,
    pub applied_at: NaiveDateTime,
    pub database_name: Option<String>,
}

/// Identities currently recorded in the ledger
pub type AppliedSet = HashSet<String>;

/// Access to one ledger table through a [`Database`]
pub struct Ledger<'a> {
    db: &'a dyn Database,
    table: &'a LedgerTable,
}

impl<'a> Ledger<'a> {
    pub fn new(db: &'a dyn Database, table: &'a LedgerTable) -> Self {
        Self { db, table }
    }

    /// The ledger table name
    pub fn table(&self) -> &LedgerTable {
        self.table
    }

    fn table_string(&self) -> String {
        self.table.to_string()
    }

    /// Create the ledger table. Fails if it already exists.
    pub async fn bootstrap(&self) -> LedgerResult<()> {
        let exists = self
            .db
            .relation_exists(self.table)
            .await
            .map_err(|source| LedgerError::Bootstrap {
                table: self.table_string(),
                source,
            })?;
        if exists {
            return Err(LedgerError::AlreadyExists {
                table: self.table_string(),
            });
        }

        let ddl = self.db.ledger_ddl(self.table);
        log::debug!("Creating ledger table: {}", ddl);
        self.db
            .execute_batch(&ddl)
            .await
            .map_err(|source| LedgerError::Bootstrap {
                table: self.table_string(),
                source,
            })?;
        Ok(())
    }

    /// Check that the ledger table exists with exactly the expected columns.
    pub async fn verify_schema(&self) -> LedgerResult<()> {
        let read_err = |source: DbError| LedgerError::Read {
            table: self.table_string(),
            source,
        };

        if !self.db.relation_exists(self.table).await.map_err(read_err)? {
            return Err(LedgerError::Missing {
                table: self.table_string(),
            });
        }

        let actual = self.db.column_names(self.table).await.map_err(read_err)?;
        let actual_lower: Vec<String> = actual.iter().map(|c| c.to_ascii_lowercase()).collect();

        let missing: Vec<&str> = EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !actual_lower.iter().any(|a| a.as_str() == *col))
            .collect();
        let unexpected: Vec<&str> = actual
            .iter()
            .zip(&actual_lower)
            .filter(|(_, lower)| !EXPECTED_COLUMNS.contains(&lower.as_str()))
            .map(|(orig, _)| orig.as_str())
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::SchemaDrift {
                table: self.table_string(),
                missing: missing.join(", "),
                unexpected: unexpected.join(", "),
            })
        }
    }

    /// Read every recorded identity.
    ///
    /// Rows that cannot be read are logged and left out.
    pub async fn load_applied(&self) -> LedgerResult<AppliedSet> {
        let sql = format!(
            "SELECT {IDENTITY_COLUMN} FROM {}",
            quote_qualified(self.table.as_str())
        );
        log::debug!("Loading applied scripts: {}", sql);

        let rows = self
            .db
            .query_strings(&sql)
            .await
            .map_err(|source| LedgerError::Read {
                table: self.table_string(),
                source,
            })?;

        let mut applied = AppliedSet::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Ok(identity) => {
                    log::debug!("Already applied: {}", identity);
                    applied.insert(identity);
                }
                Err(e) => log::warn!("Skipping unreadable ledger row {}: {}", index, e),
            }
        }
        Ok(applied)
    }

    /// Insert one row for a script that has just committed.
    pub async fn record_applied(
        &self,
        identity: &ScriptIdentity,
        database_name: Option<&str>,
    ) -> LedgerResult<LedgerRecord> {
        let record = LedgerRecord {
            identity: identity.clone(),
            applied_at: Utc::now().naive_utc(),
            database_name: database_name.map(str::to_string),
        };
        let sql = format!(
            "INSERT INTO {} ({IDENTITY_COLUMN}, {APPLIED_AT_COLUMN}, {DATABASE_NAME_COLUMN}) \
             VALUES (?, CAST(? AS TIMESTAMP), ?)",
            quote_qualified(self.table.as_str())
        );
        let params = [
            Some(record.identity.to_string()),
            Some(record.applied_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
            record.database_name.clone(),
        ];

        match self.db.execute_with_params(&sql, &params).await {
            Ok(_) => Ok(record),
            Err(DbError::UniqueViolation(_)) => Err(LedgerError::DuplicateIdentity {
                identity: identity.to_string(),
                table: self.table_string(),
            }),
            Err(source) => Err(LedgerError::Write {
                table: self.table_string(),
                identity: identity.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
