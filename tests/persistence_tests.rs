/// File-backed store lifecycle tests
///
/// Run with: cargo test --test persistence_tests
use chrono::NaiveDate;
use healthtrack::{Database, EngineConfig, NewPatient};
use tempfile::TempDir;

fn ann() -> NewPatient {
    NewPatient::new(
        "Ann",
        "Lee",
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "Female",
    )
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");

    let db = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
    let id = db.register_patient(&ann()).await.unwrap();
    db.shutdown().await.unwrap();

    let db = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
    let everyone = db.all_patients().await.unwrap();
    assert_eq!(everyone.len(), 1);
    assert_eq!(everyone[0].id, id);
    db.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bootstrap_is_idempotent_across_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");

    // Each open runs the bootstrap again; IF NOT EXISTS must keep the
    // second and third runs from failing on the existing table and index.
    for _ in 0..3 {
        let db = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
        db.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_two_live_handles_share_one_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");

    let a = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
    let b = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();

    a.register_patient(&ann()).await.unwrap();
    assert_eq!(b.count_patients().await.unwrap(), 1);

    a.shutdown().await.unwrap();
    b.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_identities_stay_monotonic_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");

    let db = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
    let first = db.register_patient(&ann()).await.unwrap();
    db.shutdown().await.unwrap();

    let db = Database::open(EngineConfig::new().at_path(&path)).await.unwrap();
    let second = db.register_patient(&ann()).await.unwrap();
    assert!(second > first);
    db.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unopenable_store_is_an_initialization_error() {
    let err = Database::open(EngineConfig::new().at_path("/dev/null/store.db"))
        .await
        .unwrap_err();
    assert!(matches!(err, healthtrack::DbError::Initialization(_)));
}
