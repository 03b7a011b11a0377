use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::{DbError, Result, Value};
use crate::result::QueryResult;

/// A stored registry row.
///
/// Required demographics are always present and non-empty; the remaining
/// contact and insurance attributes are independently nullable. `id` and
/// `created_at` are assigned by the storage engine on insert and never
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_notes: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Patient {
    /// Decode one row of a `patients` result set.
    pub(crate) fn from_result(result: &QueryResult, row: usize) -> Result<Self> {
        Ok(Self {
            id: require_integer(result, row, "id")?,
            first_name: require_text(result, row, "first_name")?,
            last_name: require_text(result, row, "last_name")?,
            date_of_birth: parse_date(&require_text(result, row, "date_of_birth")?)?,
            gender: require_text(result, row, "gender")?,
            email: optional_text(result, row, "email")?,
            phone: optional_text(result, row, "phone")?,
            address: optional_text(result, row, "address")?,
            medical_notes: optional_text(result, row, "medical_notes")?,
            insurance_provider: optional_text(result, row, "insurance_provider")?,
            insurance_id: optional_text(result, row, "insurance_id")?,
            created_at: parse_timestamp(&require_text(result, row, "created_at")?)?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration input.
///
/// Carries no identity or timestamp; the engine assigns both. Optional
/// fields default to absent and can be filled in builder style:
///
/// ```
/// use chrono::NaiveDate;
/// use healthtrack::NewPatient;
///
/// let patient = NewPatient::new(
///     "Ann",
///     "Lee",
///     NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
///     "Female",
/// )
/// .email("ann.lee@example.com")
/// .phone("+1 555 0100");
/// assert!(patient.address.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_notes: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
}

impl NewPatient {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            gender: gender.into(),
            email: None,
            phone: None,
            address: None,
            medical_notes: None,
            insurance_provider: None,
            insurance_id: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn medical_notes(mut self, notes: impl Into<String>) -> Self {
        self.medical_notes = Some(notes.into());
        self
    }

    pub fn insurance_provider(mut self, provider: impl Into<String>) -> Self {
        self.insurance_provider = Some(provider.into());
        self
    }

    pub fn insurance_id(mut self, id: impl Into<String>) -> Self {
        self.insurance_id = Some(id.into());
        self
    }
}

fn cell<'a>(result: &'a QueryResult, row: usize, column: &str) -> Result<&'a Value> {
    result
        .value(row, column)
        .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))
}

fn require_text(result: &QueryResult, row: usize, column: &str) -> Result<String> {
    match cell(result, row, column)? {
        Value::Text(text) => Ok(text.clone()),
        other => Err(DbError::TypeMismatch(format!(
            "column '{}' holds {}, expected TEXT",
            column,
            other.type_name()
        ))),
    }
}

fn require_integer(result: &QueryResult, row: usize, column: &str) -> Result<i64> {
    match cell(result, row, column)? {
        Value::Integer(i) => Ok(*i),
        other => Err(DbError::TypeMismatch(format!(
            "column '{}' holds {}, expected INTEGER",
            column,
            other.type_name()
        ))),
    }
}

fn optional_text(result: &QueryResult, row: usize, column: &str) -> Result<Option<String>> {
    match cell(result, row, column)? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text.clone())),
        other => Err(DbError::TypeMismatch(format!(
            "column '{}' holds {}, expected TEXT or NULL",
            column,
            other.type_name()
        ))),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|err| DbError::TypeMismatch(format!("invalid date '{}': {}", text, err)))
}

// CURRENT_TIMESTAMP renders as "YYYY-MM-DD HH:MM:SS".
fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .map_err(|err| DbError::TypeMismatch(format!("invalid timestamp '{}': {}", text, err)))
}
