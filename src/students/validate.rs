//! Field validation for create requests.
//!
//! Every field is checked independently and all violations are reported in a
//! single pass, in field order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::students::model::{NewStudent, ValidStudent};

/// Inclusive bounds for `age`.
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 100;

/// WHATWG "valid e-mail address" grammar.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

/// A field of the create payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Age,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Age => "age",
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Required,
    OutOfRange,
    InvalidFormat,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Reason::Required => "required",
            Reason::OutOfRange => "out of range",
            Reason::InvalidFormat => "invalid format",
        };
        f.write_str(text)
    }
}

/// One rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub reason: Reason,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field.as_str(), self.reason)
    }
}

/// The complete, ordered set of violations for one payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join(.0))]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields that were rejected, in order.
    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|v| v.field).collect()
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a decoded payload.
pub fn validate(payload: NewStudent) -> Result<ValidStudent, Violations> {
    let mut violations = Vec::new();

    if payload.name.is_empty() {
        violations.push(Violation { field: Field::Name, reason: Reason::Required });
    }

    if payload.email.is_empty() {
        violations.push(Violation { field: Field::Email, reason: Reason::Required });
    } else if !is_valid_email(&payload.email) {
        violations.push(Violation { field: Field::Email, reason: Reason::InvalidFormat });
    }

    let age = match u8::try_from(payload.age) {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&payload.age) => Some(age),
        _ => {
            violations.push(Violation { field: Field::Age, reason: Reason::OutOfRange });
            None
        }
    };

    match age {
        Some(age) if violations.is_empty() => {
            Ok(ValidStudent::new(payload.name, payload.email, age))
        }
        _ => Err(Violations(violations)),
    }
}

/// Address-syntax check used for the `email` field.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
