//! Domain model for the course catalog and student directory.
//!
//! # Responsibility
//! - Define canonical records used by registration workflows.
//! - Own the invariants a record must satisfy before it is persisted.
//!
//! # Invariants
//! - Course codes and student ids are non-empty.
//! - Course codes never contain the list separator `,`.
//! - Course capacity is never negative.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course;
pub mod student;

/// Model invariant violation detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Course code is blank after trim.
    EmptyCourseCode,
    /// Course code contains a character reserved by the storage encoding.
    InvalidCourseCode(String),
    /// Course capacity is below zero.
    NegativeCapacity { code: String, capacity: i64 },
    /// Student id is blank after trim.
    EmptyStudentId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCourseCode => write!(f, "course code must not be blank"),
            Self::InvalidCourseCode(code) => {
                write!(f, "course code `{code}` must not contain `,`")
            }
            Self::NegativeCapacity { code, capacity } => {
                write!(f, "course `{code}` has negative capacity {capacity}")
            }
            Self::EmptyStudentId => write!(f, "student id must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Checks one course code against catalog and storage rules.
pub fn validate_course_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::EmptyCourseCode);
    }
    if code.contains(student::COURSE_LIST_SEPARATOR) {
        return Err(ValidationError::InvalidCourseCode(code.to_string()));
    }
    Ok(())
}
