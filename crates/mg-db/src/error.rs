//! Error types for mg-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Unique or primary key constraint violated (D004)
    #[error("[D004] Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// BEGIN / COMMIT / ROLLBACK failed (D005)
    #[error("[D005] Transaction control failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured constraint or catalog codes,
        // so classification works on the message text.
        let msg = err.to_string();
        if msg.contains("Constraint Error")
            && (msg.contains("Duplicate key")
                || msg.contains("unique constraint")
                || msg.contains("UNIQUE constraint violated"))
        {
            DbError::UniqueViolation(msg)
        } else if !msg.contains("already exists")
            && (msg.contains("Table with name")
                || msg.contains("Table or view with name")
                || (msg.contains("Catalog Error")
                    && msg.contains("Table")
                    && msg.contains("not found")))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

/// Ledger table errors.
///
/// [`LedgerError::DuplicateIdentity`] is the one failure callers branch on:
/// it means the script is already recorded, as opposed to any other write
/// failure.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bootstrap target already exists (L001)
    #[error("[L001] Ledger table '{table}' already exists")]
    AlreadyExists { table: String },

    /// Ledger table absent (L002)
    #[error("[L002] Ledger table '{table}' not found. Create it with `migrant init`.")]
    Missing { table: String },

    /// Ledger columns differ from the expected layout (L003)
    #[error("[L003] Ledger table '{table}' has an unexpected layout (missing columns: [{missing}], unexpected columns: [{unexpected}]). Drop it and re-create it with `migrant init`.")]
    SchemaDrift {
        table: String,
        missing: String,
        unexpected: String,
    },

    /// Identity already recorded (L004)
    #[error("[L004] Script '{identity}' is already recorded in ledger table '{table}'")]
    DuplicateIdentity { identity: String, table: String },

    /// Reading the ledger failed (L005)
    #[error("[L005] Failed to read ledger table '{table}': {source}")]
    Read {
        table: String,
        #[source]
        source: DbError,
    },

    /// Writing the ledger failed for a reason other than a duplicate (L006)
    #[error("[L006] Failed to record '{identity}' in ledger table '{table}': {source}")]
    Write {
        table: String,
        identity: String,
        #[source]
        source: DbError,
    },

    /// Creating the ledger table failed (L007)
    #[error("[L007] Failed to create ledger table '{table}': {source}")]
    Bootstrap {
        table: String,
        #[source]
        source: DbError,
    },
}

impl LedgerError {
    /// Whether this is the "already recorded" condition
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LedgerError::DuplicateIdentity { .. })
    }
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure while applying one script
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Transaction could not be opened (X001)
    #[error("[X001] Could not start a transaction for '{identity}': {source}")]
    Begin {
        identity: String,
        #[source]
        source: DbError,
    },

    /// A batch failed; the transaction was rolled back (X002)
    #[error("[X002] Script '{identity}' failed at batch {index}: {source}")]
    Batch {
        identity: String,
        index: usize,
        #[source]
        source: DbError,
    },

    /// All batches succeeded but COMMIT failed (X003)
    #[error("[X003] Could not commit '{identity}': {source}")]
    Commit {
        identity: String,
        #[source]
        source: DbError,
    },

    /// Dry-run rollback failed, so the database state is unknown (X004)
    #[error("[X004] Could not roll back dry run of '{identity}': {source}")]
    Rollback {
        identity: String,
        #[source]
        source: DbError,
    },
}
