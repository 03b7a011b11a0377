use thiserror::Error;

/// Errors surfaced by the registry database layer.
///
/// `Initialization` is fatal for the session: the shared handle caches it and
/// replays it on every later call instead of retrying, which is why the enum
/// is `Clone`.
#[derive(Error, Debug, Clone)]
pub enum DbError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Column '{0}' not found in result set")]
    ColumnNotFound(String),

    #[error("Database worker disconnected")]
    Disconnected,

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
