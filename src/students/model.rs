//! Student record types.

use serde::{Deserialize, Serialize};

/// Store-assigned student identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl From<i64> for StudentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<StudentId> for i64 {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of a create request, exactly as the client sent it.
///
/// Missing fields decode to empty/zero so the validator reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// A payload that passed validation.
///
/// Only [`validate`](super::validate::validate) constructs this, so a store
/// never sees a partially valid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    name: String,
    email: String,
    age: u8,
}

impl ValidStudent {
    pub(super) fn new(name: String, email: String, age: u8) -> Self {
        Self { name, email, age }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    /// Attach the identifier assigned by a store.
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
        }
    }
}

/// A persisted student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub age: u8,
}

/// Body of a successful create response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: StudentId,
}
