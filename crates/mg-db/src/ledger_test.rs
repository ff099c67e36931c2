use super::*;
use crate::DuckDbBackend;

fn table() -> LedgerTable {
    LedgerTable::try_new("migrant_version").unwrap()
}

fn id(s: &str) -> ScriptIdentity {
    ScriptIdentity::try_new(s).unwrap()
}

#[tokio::test]
async fn test_bootstrap_then_verify() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let ledger = Ledger::new(&db, &table);

    ledger.bootstrap().await.unwrap();
    ledger.verify_schema().await.unwrap();
    assert!(ledger.load_applied().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_twice_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let ledger = Ledger::new(&db, &table);

    ledger.bootstrap().await.unwrap();
    let err = ledger.bootstrap().await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_bootstrap_in_schema() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE SCHEMA ops").await.unwrap();
    let table = LedgerTable::try_new("ops.versions").unwrap();
    let ledger = Ledger::new(&db, &table);

    ledger.bootstrap().await.unwrap();
    ledger.verify_schema().await.unwrap();
    ledger.record_applied(&id("1_init"), None).await.unwrap();
    assert!(ledger.load_applied().await.unwrap().contains("1_init"));
}

#[tokio::test]
async fn test_verify_missing_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let err = Ledger::new(&db, &table).verify_schema().await.unwrap_err();
    assert!(matches!(err, LedgerError::Missing { .. }));
    assert!(err.to_string().contains("migrant init"));
}

#[tokio::test]
async fn test_verify_detects_drift() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE migrant_version (ledger_id UUID, script_name VARCHAR, applied_on TIMESTAMP, database_name VARCHAR)",
    )
    .await
    .unwrap();
    let table = table();

    let err = Ledger::new(&db, &table).verify_schema().await.unwrap_err();
    match err {
        LedgerError::SchemaDrift {
            missing,
            unexpected,
            ..
        } => {
            assert_eq!(missing, "applied_at");
            assert_eq!(unexpected, "applied_on");
        }
        other => panic!("expected SchemaDrift, got {other:?}"),
    }
}

#[tokio::test]
async fn test_verify_ignores_column_case() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE migrant_version (\"LEDGER_ID\" UUID, \"Script_Name\" VARCHAR, \"APPLIED_AT\" TIMESTAMP, \"database_name\" VARCHAR)",
    )
    .await
    .unwrap();
    let table = table();
    Ledger::new(&db, &table).verify_schema().await.unwrap();
}

#[tokio::test]
async fn test_record_then_load_round_trip() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let ledger = Ledger::new(&db, &table);
    ledger.bootstrap().await.unwrap();

    let record = ledger
        .record_applied(&id("1_init"), Some("memory"))
        .await
        .unwrap();
    assert_eq!(record.identity, "1_init");
    assert_eq!(record.database_name.as_deref(), Some("memory"));

    let applied = ledger.load_applied().await.unwrap();
    assert_eq!(applied.len(), 1);
    assert!(applied.contains("1_init"));
}

#[tokio::test]
async fn test_record_duplicate_is_distinguishable() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let ledger = Ledger::new(&db, &table);
    ledger.bootstrap().await.unwrap();

    ledger.record_applied(&id("2_users"), None).await.unwrap();
    let err = ledger.record_applied(&id("2_users"), None).await.unwrap_err();

    assert!(err.is_duplicate());
    assert!(matches!(err, LedgerError::DuplicateIdentity { ref identity, .. } if identity == "2_users"));
}

#[tokio::test]
async fn test_record_without_table_is_generic_write_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = table();
    let err = Ledger::new(&db, &table)
        .record_applied(&id("1_init"), None)
        .await
        .unwrap_err();
    assert!(!err.is_duplicate());
    assert!(matches!(err, LedgerError::Write { .. }));
}

#[tokio::test]
async fn test_load_skips_unreadable_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    // Same columns as the real ledger, but without NOT NULL so a bad row can exist.
    db.execute_batch(
        "CREATE TABLE migrant_version (ledger_id UUID, script_name VARCHAR, applied_at TIMESTAMP, database_name VARCHAR);
         INSERT INTO migrant_version VALUES (gen_random_uuid(), '1_init', TIMESTAMP '2024-01-01 00:00:00', NULL);
         INSERT INTO migrant_version VALUES (gen_random_uuid(), NULL, TIMESTAMP '2024-01-01 00:00:00', NULL);
         INSERT INTO migrant_version VALUES (gen_random_uuid(), '2_users', TIMESTAMP '2024-01-01 00:00:00', NULL);",
    )
    .await
    .unwrap();
    let table = table();
    let ledger = Ledger::new(&db, &table);
    ledger.verify_schema().await.unwrap();

    let applied = ledger.load_applied().await.unwrap();
    assert_eq!(applied.len(), 2);
    assert!(applied.contains("1_init"));
    assert!(applied.contains("2_users"));
}
