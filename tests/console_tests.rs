/// Free-form query pass-through tests
///
/// Run with: cargo test --test console_tests
use chrono::NaiveDate;
use healthtrack::{Database, EngineConfig, NewPatient, Value};

async fn open_registry() -> Database {
    Database::open(EngineConfig::new().in_memory())
        .await
        .unwrap()
}

fn ann() -> NewPatient {
    NewPatient::new(
        "Ann",
        "Lee",
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "Female",
    )
}

#[tokio::test]
async fn test_invalid_statement_reports_failure() {
    let db = open_registry().await;

    let outcome = db.execute_query("SELECT * FORM patients", Vec::new()).await;

    assert!(!outcome.success);
    assert!(outcome.rows.is_empty());
    assert!(!outcome.error.as_deref().unwrap_or("").is_empty());
}

#[tokio::test]
async fn test_host_survives_statement_failure() {
    let db = open_registry().await;

    let bad = db.execute_query("SELECT * FORM patients", Vec::new()).await;
    assert!(!bad.success);

    db.register_patient(&ann()).await.unwrap();
    let good = db.execute_query("SELECT * FROM patients", Vec::new()).await;
    assert!(good.success);
    assert_eq!(good.rows.row_count(), 1);
}

#[tokio::test]
async fn test_select_returns_explicit_nulls() {
    let db = open_registry().await;
    db.register_patient(&ann()).await.unwrap();

    let outcome = db
        .execute_query("SELECT email FROM patients", Vec::new())
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.rows.value(0, "email"), Some(&Value::Null));
}

#[tokio::test]
async fn test_insert_through_console_is_visible_to_typed_reads() {
    let db = open_registry().await;

    let outcome = db
        .execute_query(
            "INSERT INTO patients (first_name, last_name, date_of_birth, gender) \
             VALUES (?1, ?2, ?3, ?4)",
            vec![
                Value::from("Ben"),
                Value::from("Kim"),
                Value::from("1985-06-15"),
                Value::from("Male"),
            ],
        )
        .await;
    assert!(outcome.success);

    let everyone = db.all_patients().await.unwrap();
    assert_eq!(everyone.len(), 1);
    assert_eq!(everyone[0].first_name, "Ben");
}

#[tokio::test]
async fn test_aggregate_query() {
    let db = open_registry().await;
    db.register_patient(&ann()).await.unwrap();
    db.register_patient(&NewPatient::new(
        "Ben",
        "Kim",
        NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        "Male",
    ))
    .await
    .unwrap();

    let outcome = db
        .execute_query(
            "SELECT gender, COUNT(*) AS count FROM patients GROUP BY gender ORDER BY gender",
            Vec::new(),
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.rows.row_count(), 2);
    assert_eq!(outcome.rows.value(0, "gender"), Some(&Value::Text("Female".into())));
    assert_eq!(outcome.rows.value(0, "count"), Some(&Value::Integer(1)));
}

#[tokio::test]
async fn test_constraint_violation_is_reported_not_thrown() {
    let db = open_registry().await;

    let outcome = db
        .execute_query(
            "INSERT INTO patients (first_name, last_name, date_of_birth, gender) \
             VALUES (NULL, 'Kim', '1985-06-15', 'Male')",
            Vec::new(),
        )
        .await;

    assert!(!outcome.success);
    let message = outcome.error.unwrap();
    assert!(message.contains("NOT NULL"), "unexpected message: {}", message);
}

#[tokio::test]
async fn test_rows_serialize_as_objects() {
    let db = open_registry().await;
    db.register_patient(&ann()).await.unwrap();

    let outcome = db
        .execute_query("SELECT first_name, email FROM patients", Vec::new())
        .await;

    let json = serde_json::to_value(&outcome.rows).unwrap();
    assert_eq!(json[0]["first_name"], "Ann");
    assert!(json[0]["email"].is_null());
}
