//! Course catalog record.
//!
//! # Responsibility
//! - Define the catalog entry a student registers against.
//!
//! # Invariants
//! - `code` is unique in the catalog and never reused.
//! - `capacity` counts remaining seats and stays `>= 0`.

use super::{validate_course_code, ValidationError};
use serde::{Deserialize, Serialize};

/// Catalog entry with its remaining seat count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique catalog code, e.g. `IFM02A2`.
    pub code: String,
    pub title: String,
    pub description: String,
    /// Remaining seats. Decremented per registration, incremented per drop.
    pub capacity: i64,
    /// Free-form meeting pattern, e.g. `MWF 10:00-11:00`.
    pub schedule: String,
}

impl Course {
    /// Creates a course record.
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        capacity: i64,
        schedule: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            description: description.into(),
            capacity,
            schedule: schedule.into(),
        }
    }

    /// Validates catalog invariants.
    ///
    /// # Errors
    /// - `EmptyCourseCode` / `InvalidCourseCode` for unusable codes.
    /// - `NegativeCapacity` when `capacity < 0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_course_code(&self.code)?;
        if self.capacity < 0 {
            return Err(ValidationError::NegativeCapacity {
                code: self.code.clone(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Returns whether at least one seat is left.
    pub fn has_open_seat(&self) -> bool {
        self.capacity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::Course;
    use crate::model::ValidationError;

    fn sample(code: &str, capacity: i64) -> Course {
        Course::new(code, "Title", "Description", capacity, "MWF 10:00-11:00")
    }

    #[test]
    fn validate_accepts_zero_capacity() {
        let course = sample("IFM02A2", 0);
        assert!(course.validate().is_ok());
        assert!(!course.has_open_seat());
    }

    #[test]
    fn validate_rejects_negative_capacity() {
        let err = sample("IFM02A2", -1).validate().unwrap_err();
        assert!(matches!(err, ValidationError::NegativeCapacity { capacity: -1, .. }));
    }

    #[test]
    fn validate_rejects_separator_in_code() {
        let err = sample("IFM,02", 5).validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidCourseCode("IFM,02".to_string()));
    }

    #[test]
    fn validate_rejects_blank_code() {
        assert_eq!(
            sample("  ", 5).validate().unwrap_err(),
            ValidationError::EmptyCourseCode
        );
    }
}
