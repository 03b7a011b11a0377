use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::core::{DbError, NewPatient, Patient, Result, Value};
use crate::engine::{EngineConfig, EngineHandle};
use crate::result::{QueryOutcome, QueryResult};

const CREATE_PATIENTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    gender TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    address TEXT,
    medical_notes TEXT,
    insurance_provider TEXT,
    insurance_id TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

// Backs both the listing order and the name search.
const CREATE_NAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_patient_name ON patients (last_name, first_name)";

const PATIENT_COLUMNS: &str = "\
id, first_name, last_name, date_of_birth, gender, email, phone, address, \
medical_notes, insurance_provider, insurance_id, created_at";

const INSERT_PATIENT: &str = "\
INSERT INTO patients
    (first_name, last_name, date_of_birth, gender, email, phone, address,
     medical_notes, insurance_provider, insurance_id)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
RETURNING id";

// Process-wide handle. Once a first call settles this cell, every later
// call sees the same handle or the same cached failure; there is no retry
// and no way back within a session.
static DATABASE: OnceCell<Result<Database>> = OnceCell::const_new();

/// Shared handle over the fixed application store, created at most once per
/// process. Concurrent first calls coalesce into a single worker/engine
/// creation and one schema bootstrap.
pub async fn init_database() -> Result<Database> {
    let slot = DATABASE
        .get_or_init(|| async {
            info!("initializing shared patient database");
            Database::open(EngineConfig::new()).await
        })
        .await;

    match slot {
        Ok(db) => Ok(db.clone()),
        Err(err) => {
            error!(error = %err, "shared database unavailable");
            Err(err.clone())
        }
    }
}

/// Single gateway between presentation code and the engine worker.
///
/// Every operation funnels through one query primitive on the bridge.
/// Cloning is cheap and clones share the worker.
///
/// ```no_run
/// use chrono::NaiveDate;
/// use healthtrack::{Database, EngineConfig, NewPatient};
///
/// # async fn demo() -> healthtrack::Result<()> {
/// let db = Database::open(EngineConfig::new().in_memory()).await?;
///
/// let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
/// let id = db
///     .register_patient(&NewPatient::new("Ann", "Lee", dob, "Female"))
///     .await?;
///
/// let everyone = db.all_patients().await?;
/// assert_eq!(everyone[0].id, id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Database {
    engine: EngineHandle,
}

impl Database {
    /// Spawn the worker, open the store, and run schema bootstrap. Public so
    /// tests and embedders can hold isolated instances; application code
    /// normally goes through [`init_database`].
    pub async fn open(config: EngineConfig) -> Result<Self> {
        let engine = EngineHandle::spawn(config).await?;
        let db = Self { engine };
        db.bootstrap().await?;
        Ok(db)
    }

    // Idempotent: both statements are IF NOT EXISTS, so a second handle on
    // the same store bootstraps without error.
    async fn bootstrap(&self) -> Result<()> {
        for statement in [CREATE_PATIENTS_TABLE, CREATE_NAME_INDEX] {
            self.engine
                .query(statement, Vec::new())
                .await
                .map_err(|err| {
                    DbError::Initialization(format!("schema bootstrap failed: {}", err))
                })?;
        }
        info!("database schema initialized");
        Ok(())
    }

    /// Insert one registration and return the engine-assigned identity.
    ///
    /// Performs no input validation; that belongs to the caller (see the
    /// `validate` module). Blank optional fields are bound as NULL.
    pub async fn register_patient(&self, patient: &NewPatient) -> Result<i64> {
        let params = vec![
            Value::from(patient.first_name.as_str()),
            Value::from(patient.last_name.as_str()),
            Value::from(patient.date_of_birth.format("%Y-%m-%d").to_string()),
            Value::from(patient.gender.as_str()),
            optional(&patient.email),
            optional(&patient.phone),
            optional(&patient.address),
            optional(&patient.medical_notes),
            optional(&patient.insurance_provider),
            optional(&patient.insurance_id),
        ];

        let result = self
            .engine
            .query(INSERT_PATIENT, params)
            .await
            .map_err(|err| {
                error!(error = %err, "patient registration failed");
                err
            })?;

        result
            .value(0, "id")
            .and_then(Value::as_i64)
            .ok_or_else(|| DbError::Storage("insert did not return a row id".into()))
    }

    /// Every patient, ordered by (last name, first name) ascending.
    pub async fn all_patients(&self) -> Result<Vec<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients ORDER BY last_name, first_name",
            PATIENT_COLUMNS
        );
        let result = self.engine.query(sql, Vec::new()).await.map_err(|err| {
            error!(error = %err, "patient listing failed");
            err
        })?;
        decode_patients(&result)
    }

    /// Case-insensitive substring search over first name, last name, and the
    /// space-joined full name; same ordering as [`Self::all_patients`].
    ///
    /// A blank term returns the whole registry.
    pub async fn search_patients_by_name(&self, term: &str) -> Result<Vec<Patient>> {
        let term = term.trim();
        if term.is_empty() {
            return self.all_patients().await;
        }

        let sql = format!(
            "SELECT {} FROM patients \
             WHERE lower(first_name) LIKE ?1 \
                OR lower(last_name) LIKE ?1 \
                OR lower(first_name || ' ' || last_name) LIKE ?1 \
             ORDER BY last_name, first_name",
            PATIENT_COLUMNS
        );
        let pattern = Value::from(format!("%{}%", term.to_lowercase()));
        let result = self.engine.query(sql, vec![pattern]).await.map_err(|err| {
            error!(error = %err, term, "patient search failed");
            err
        })?;
        decode_patients(&result)
    }

    /// Registry size, for the dashboard tile.
    pub async fn count_patients(&self) -> Result<i64> {
        let result = self
            .engine
            .query("SELECT COUNT(*) AS total FROM patients", Vec::new())
            .await
            .map_err(|err| {
                error!(error = %err, "patient count failed");
                err
            })?;
        result
            .value(0, "total")
            .and_then(Value::as_i64)
            .ok_or_else(|| DbError::Storage("count query returned no rows".into()))
    }

    /// Pass a statement through verbatim. Never fails: engine errors come
    /// back as `success = false` plus the message, so an interactive console
    /// can render them without a handler.
    pub async fn execute_query(&self, sql: &str, params: Vec<Value>) -> QueryOutcome {
        match self.engine.query(sql, params).await {
            Ok(result) => QueryOutcome::ok(result),
            Err(err) => QueryOutcome::failed(err.to_string()),
        }
    }

    /// Tear down the worker. Only meaningful for handles obtained from
    /// [`Database::open`]; the shared [`init_database`] handle lives for the
    /// process.
    pub async fn shutdown(self) -> Result<()> {
        self.engine.shutdown().await
    }
}

// Mirrors the registration form contract: an empty or whitespace-only
// optional field is stored as NULL, never as an empty string.
fn optional(field: &Option<String>) -> Value {
    match field {
        Some(text) if !text.trim().is_empty() => Value::from(text.as_str()),
        _ => Value::Null,
    }
}

fn decode_patients(result: &QueryResult) -> Result<Vec<Patient>> {
    (0..result.row_count())
        .map(|row| Patient::from_result(result, row))
        .collect()
}
