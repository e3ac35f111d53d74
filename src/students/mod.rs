//! Student domain: record types and field validation.
//!
//! # Data Flow
//! ```text
//! request body
//!     → NewStudent (decoded, unchecked)
//!     → validate.rs (all fields, no short-circuit)
//!     → ValidStudent | Violations
//!     → storage port assigns StudentId → Student
//! ```

pub mod model;
pub mod validate;

pub use model::{Created, NewStudent, Student, StudentId, ValidStudent};
pub use validate::{validate, Field, Reason, Violation, Violations};
