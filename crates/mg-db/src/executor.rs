//! Transactional application of one migration script.
//!
//! The script is split into batches and every batch runs inside a single
//! transaction. The first failing batch stops the script and rolls the
//! transaction back, so a script is either fully committed or leaves no
//! trace. With `commit = false` the transaction is rolled back even when
//! every batch succeeds.

use crate::error::ApplyError;
use crate::traits::Database;
use mg_core::splitter::{is_blank_batch, split_batches};
use mg_core::MigrationScript;
use std::time::{Duration, Instant};

/// Result of executing one batch
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// 0-based position of the batch in the script
    pub index: usize,
    /// Batch text as sent to the database
    pub batch: String,
    /// Error message when the batch failed
    pub error: Option<String>,
    /// Affected rows, when the backend reports them
    pub rows_affected: Option<usize>,
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// How a successful application ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Changes are persisted
    Committed,
    /// Every batch ran but the transaction was rolled back (dry run)
    RolledBack,
}

/// Everything [`ScriptExecutor::apply`] produced for one script
#[derive(Debug)]
pub struct Application {
    /// One entry per attempted batch, ending at the first failure
    pub outcomes: Vec<ExecutionOutcome>,
    pub result: Result<Disposition, ApplyError>,
}

impl Application {
    /// Whether the script's changes were committed
    pub fn committed(&self) -> bool {
        matches!(self.result, Ok(Disposition::Committed))
    }
}

/// Applies scripts against one database connection
pub struct ScriptExecutor<'a> {
    db: &'a dyn Database,
    separator: &'a str,
}

impl<'a> ScriptExecutor<'a> {
    pub fn new(db: &'a dyn Database, separator: &'a str) -> Self {
        Self { db, separator }
    }

    /// Run every batch of `script` in one transaction.
    ///
    /// Commits when `commit` is true and all batches succeed; rolls back
    /// otherwise.
    pub async fn apply(&self, script: &MigrationScript, commit: bool) -> Application {
        let identity = script.identity.to_string();
        let mut outcomes = Vec::new();

        if let Err(source) = self.db.begin().await {
            return Application {
                outcomes,
                result: Err(ApplyError::Begin { identity, source }),
            };
        }

        for (index, batch) in split_batches(&script.content, self.separator)
            .into_iter()
            .enumerate()
        {
            log::debug!("{}> {}", index, batch.trim_end());
            let started = Instant::now();

            let executed = if is_blank_batch(&batch) {
                Ok(None)
            } else {
                self.db.execute_batch(&batch).await
            };

            match executed {
                Ok(rows_affected) => {
                    if let Some(rows) = rows_affected {
                        log::debug!("rows affected: {}", rows);
                    }
                    outcomes.push(ExecutionOutcome {
                        index,
                        batch,
                        error: None,
                        rows_affected,
                        elapsed: started.elapsed(),
                    });
                }
                Err(source) => {
                    outcomes.push(ExecutionOutcome {
                        index,
                        batch,
                        error: Some(source.to_string()),
                        rows_affected: None,
                        elapsed: started.elapsed(),
                    });
                    self.rollback_after_failure(&identity).await;
                    return Application {
                        outcomes,
                        result: Err(ApplyError::Batch {
                            identity,
                            index,
                            source,
                        }),
                    };
                }
            }
        }

        let result = if commit {
            self.commit(&identity).await
        } else {
            self.db
                .rollback()
                .await
                .map(|()| Disposition::RolledBack)
                .map_err(|source| ApplyError::Rollback { identity, source })
        };

        Application { outcomes, result }
    }

    async fn commit(&self, identity: &str) -> Result<Disposition, ApplyError> {
        match self.db.commit().await {
            Ok(()) => Ok(Disposition::Committed),
            Err(source) => {
                self.rollback_after_failure(identity).await;
                Err(ApplyError::Commit {
                    identity: identity.to_string(),
                    source,
                })
            }
        }
    }

    async fn rollback_after_failure(&self, identity: &str) {
        if let Err(e) = self.db.rollback().await {
            log::warn!("Rollback of '{}' failed: {}", identity, e);
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
