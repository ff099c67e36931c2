use super::*;
use crate::error::{DbError, DbResult};
use crate::DuckDbBackend;
use async_trait::async_trait;
use mg_core::LedgerTable;
use std::path::PathBuf;
use std::sync::Mutex;

fn script(name: &str, content: &str) -> MigrationScript {
    MigrationScript::from_parts(PathBuf::from(format!("{name}.sql")), content.to_string())
        .unwrap()
}

#[tokio::test]
async fn test_apply_commits_all_batches() {
    let db = DuckDbBackend::in_memory().unwrap();
    let s = script(
        "1_init",
        "CREATE TABLE users (id INT);\nGO\nINSERT INTO users VALUES (1), (2);\n",
    );

    let app = ScriptExecutor::new(&db, "GO").apply(&s, true).await;

    assert!(app.committed());
    assert_eq!(app.outcomes.len(), 2);
    assert!(app.outcomes.iter().all(|o| o.is_success()));
    assert!(db.relation_exists("users").await.unwrap());
    let rows = db.query_strings("SELECT CAST(COUNT(*) AS VARCHAR) FROM users").await.unwrap();
    assert_eq!(rows[0].as_deref().unwrap(), "2");
}

#[tokio::test]
async fn test_failure_stops_and_rolls_back() {
    let db = DuckDbBackend::in_memory().unwrap();
    let s = script(
        "2_broken",
        "CREATE TABLE t (id INT);\nGO\nINSERT INTO missing_table VALUES (1);\nGO\nCREATE TABLE never (id INT);\n",
    );

    let app = ScriptExecutor::new(&db, "GO").apply(&s, true).await;

    assert_eq!(app.outcomes.len(), 2);
    assert!(app.outcomes[0].is_success());
    assert!(app.outcomes[1].error.is_some());
    match app.result {
        Err(ApplyError::Batch {
            ref identity,
            index,
            ..
        }) => {
            assert_eq!(identity, "2_broken");
            assert_eq!(index, 1);
        }
        ref other => panic!("expected batch error, got {other:?}"),
    }
    assert!(!db.relation_exists("t").await.unwrap());
    assert!(!db.relation_exists("never").await.unwrap());
}

#[tokio::test]
async fn test_dry_run_executes_but_rolls_back() {
    let db = DuckDbBackend::in_memory().unwrap();
    let s = script(
        "3_fake",
        "CREATE TABLE staged (id INT);\nGO\nINSERT INTO staged VALUES (1);\n",
    );

    let app = ScriptExecutor::new(&db, "GO").apply(&s, false).await;

    assert_eq!(app.outcomes.len(), 2);
    assert!(app.outcomes.iter().all(|o| o.is_success()));
    assert!(matches!(app.result, Ok(Disposition::RolledBack)));
    assert!(!app.committed());
    assert!(!db.relation_exists("staged").await.unwrap());
}

#[tokio::test]
async fn test_blank_batches_are_noops() {
    let db = DuckDbBackend::in_memory().unwrap();
    let s = script("4_blank", "GO\nCREATE TABLE b (id INT);\nGO\n   \nGO\n");

    let app = ScriptExecutor::new(&db, "GO").apply(&s, true).await;

    assert!(app.committed());
    assert_eq!(app.outcomes.len(), 3);
    assert!(app.outcomes.iter().all(|o| o.is_success()));
    assert!(db.relation_exists("b").await.unwrap());
}

#[tokio::test]
async fn test_database_usable_after_failed_script() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = ScriptExecutor::new(&db, "GO");

    let bad = script("5_bad", "SELEC 1;\n");
    assert!(executor.apply(&bad, true).await.result.is_err());

    let good = script("6_good", "CREATE TABLE ok (id INT);\n");
    assert!(executor.apply(&good, true).await.committed());
    assert!(db.relation_exists("ok").await.unwrap());
}

/// Backend that records calls and fails on demand.
#[derive(Default)]
struct ScriptedDb {
    fail_begin: bool,
    fail_commit: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDb {
    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for ScriptedDb {
    async fn execute_batch(&self, sql: &str) -> DbResult<Option<usize>> {
        self.log(&format!("exec {}", sql.trim()));
        Ok(Some(3))
    }
    async fn execute_with_params(&self, _sql: &str, _params: &[Option<String>]) -> DbResult<usize> {
        Ok(1)
    }
    async fn query_strings(&self, _sql: &str) -> DbResult<Vec<DbResult<String>>> {
        Ok(Vec::new())
    }
    async fn relation_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(true)
    }
    async fn column_names(&self, _name: &str) -> DbResult<Vec<String>> {
        Ok(Vec::new())
    }
    async fn current_database(&self) -> DbResult<String> {
        Ok("scripted".to_string())
    }
    async fn begin(&self) -> DbResult<()> {
        self.log("begin");
        if self.fail_begin {
            return Err(DbError::TransactionError("begin refused".to_string()));
        }
        Ok(())
    }
    async fn commit(&self) -> DbResult<()> {
        self.log("commit");
        if self.fail_commit {
            return Err(DbError::TransactionError("commit refused".to_string()));
        }
        Ok(())
    }
    async fn rollback(&self) -> DbResult<()> {
        self.log("rollback");
        Ok(())
    }
    fn ledger_ddl(&self, _table: &LedgerTable) -> String {
        String::new()
    }
}

#[tokio::test]
async fn test_rows_affected_reported_when_available() {
    let db = ScriptedDb::default();
    let app = ScriptExecutor::new(&db, "GO")
        .apply(&script("7_rows", "UPDATE t SET x = 1;\n"), true)
        .await;

    assert_eq!(app.outcomes[0].rows_affected, Some(3));
    assert_eq!(db.calls(), vec!["begin", "exec UPDATE t SET x = 1;", "commit"]);
}

#[tokio::test]
async fn test_begin_failure_executes_nothing() {
    let db = ScriptedDb {
        fail_begin: true,
        ..Default::default()
    };
    let app = ScriptExecutor::new(&db, "GO")
        .apply(&script("8_begin", "SELECT 1;\n"), true)
        .await;

    assert!(app.outcomes.is_empty());
    assert!(matches!(app.result, Err(ApplyError::Begin { .. })));
    assert_eq!(db.calls(), vec!["begin"]);
}

#[tokio::test]
async fn test_commit_failure_rolls_back() {
    let db = ScriptedDb {
        fail_commit: true,
        ..Default::default()
    };
    let app = ScriptExecutor::new(&db, "GO")
        .apply(&script("9_commit", "SELECT 1;\n"), true)
        .await;

    assert_eq!(app.outcomes.len(), 1);
    assert!(matches!(app.result, Err(ApplyError::Commit { .. })));
    assert_eq!(db.calls(), vec!["begin", "exec SELECT 1;", "commit", "rollback"]);
}

#[tokio::test]
async fn test_dry_run_never_commits() {
    let db = ScriptedDb::default();
    let app = ScriptExecutor::new(&db, "GO")
        .apply(&script("10_dry", "A\nGO\nB\n"), false)
        .await;

    assert!(matches!(app.result, Ok(Disposition::RolledBack)));
    assert_eq!(db.calls(), vec!["begin", "exec A", "exec B", "rollback"]);
}
