// ============================================================================
// HealthTrack Patient Registry
// ============================================================================

//! Patient registry on an embedded SQL engine.
//!
//! The one live engine connection runs on a dedicated worker thread behind a
//! correlation-ID request/response bridge, so slow statements never block the
//! async executor. The [`Database`] facade is the single gateway: typed
//! registry operations plus a verbatim [`Database::execute_query`] pass-through
//! for the interactive console.
//!
//! ```no_run
//! use healthtrack::init_database;
//!
//! # async fn demo() -> healthtrack::Result<()> {
//! // First call spawns the worker and bootstraps the schema; every later
//! // call gets the same shared handle.
//! let db = init_database().await?;
//! println!("{} patients registered", db.count_patients().await?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod engine;
pub mod facade;
pub mod result;
pub mod validate;

// Re-export main types for convenience
pub use self::core::{DbError, NewPatient, Patient, Result, Value};
pub use engine::{DEFAULT_STORE, EngineConfig, EngineHandle, StorageLocation};
pub use facade::{Database, init_database};
pub use result::{QueryOutcome, QueryResult, Row};
pub use validate::{FieldError, validate_registration};
