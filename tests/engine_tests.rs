/// Worker bridge behavior under concurrency
///
/// Run with: cargo test --test engine_tests
use chrono::NaiveDate;
use healthtrack::{Database, EngineConfig, NewPatient};

async fn open_registry() -> Database {
    Database::open(EngineConfig::new().in_memory())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_requests_resolve_to_their_callers() {
    let db = open_registry().await;

    // Many in-flight statements at once; each task must get its own row
    // back, which only works if responses are matched to callers correctly.
    let mut handles = Vec::new();
    for n in 0..16 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let last = format!("Patient{:02}", n);
            let input = NewPatient::new(
                "Test",
                last.clone(),
                NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                "Other",
            );
            let id = db.register_patient(&input).await.unwrap();

            let hits = db.search_patients_by_name(&last).await.unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].id, id);
            assert_eq!(hits[0].last_name, last);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(db.count_patients().await.unwrap(), 16);
}

#[tokio::test]
async fn test_failures_stay_local_to_their_call() {
    let db = open_registry().await;

    let mut handles = Vec::new();
    for n in 0..8 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            if n % 2 == 0 {
                let outcome = db.execute_query("SELECT * FORM nowhere", Vec::new()).await;
                assert!(!outcome.success);
            } else {
                let outcome = db.execute_query("SELECT 1 AS one", Vec::new()).await;
                assert!(outcome.success, "good statement failed: {:?}", outcome.error);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_instances_are_isolated() {
    let a = open_registry().await;
    let b = open_registry().await;

    a.register_patient(&NewPatient::new(
        "Ann",
        "Lee",
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "Female",
    ))
    .await
    .unwrap();

    assert_eq!(a.count_patients().await.unwrap(), 1);
    assert_eq!(b.count_patients().await.unwrap(), 0);
}

#[tokio::test]
async fn test_shutdown_completes() {
    let db = open_registry().await;
    db.register_patient(&NewPatient::new(
        "Ann",
        "Lee",
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "Female",
    ))
    .await
    .unwrap();

    db.shutdown().await.unwrap();
}
