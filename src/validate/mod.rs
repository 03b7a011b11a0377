//! Registration-input checks.
//!
//! These run in presentation code before anything reaches storage; the
//! database facade itself validates nothing and will happily take any
//! non-blank strings. Date of birth is typed, so its presence and format
//! are enforced by construction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::NewPatient;

lazy_static! {
    static ref EMAIL_FORMAT: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    static ref PHONE_FORMAT: Regex = Regex::new(r"^[0-9+\-\s()]{7,15}$").unwrap();
}

/// One rejected field, keyed so a form can attach the message to its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a registration before submitting it. Returns every violation, not
/// just the first.
pub fn validate_registration(input: &NewPatient) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if input.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "First name is required"));
    }
    if input.last_name.trim().is_empty() {
        errors.push(FieldError::new("last_name", "Last name is required"));
    }
    if input.gender.trim().is_empty() {
        errors.push(FieldError::new("gender", "Gender is required"));
    }

    if let Some(email) = non_blank(&input.email) {
        if !EMAIL_FORMAT.is_match(email) {
            errors.push(FieldError::new("email", "Invalid email format"));
        }
    }
    if let Some(phone) = non_blank(&input.phone) {
        if !PHONE_FORMAT.is_match(phone) {
            errors.push(FieldError::new("phone", "Invalid phone number"));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// Blank optional fields are stored as NULL, so they are not format-checked.
fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
