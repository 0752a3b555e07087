//! Student directory record and its enrollment list.
//!
//! # Responsibility
//! - Define the student record mutated by registration workflows.
//! - Own the ordered, duplicate-free course list and its storage encoding.
//!
//! # Invariants
//! - `RegisteredCourses` never holds the same code twice.
//! - Insertion order is preserved; removal keeps the order of the rest.
//! - Comma encoding exists only at the storage boundary (`encode`/`decode`).

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Separator used by the persisted `registered_courses` column.
pub const COURSE_LIST_SEPARATOR: char = ',';

/// Ordered set of course codes a student is enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RegisteredCourses {
    codes: Vec<String>,
}

impl RegisteredCourses {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `code` is enrolled. Exact match only.
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|existing| existing == code)
    }

    /// Appends `code` unless it is already present.
    ///
    /// Returns `false` when the list already contained `code`.
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        if self.contains(&code) {
            return false;
        }
        self.codes.push(code);
        true
    }

    /// Removes `code` if present.
    ///
    /// Returns `false` when the list did not contain `code`.
    pub fn remove(&mut self, code: &str) -> bool {
        match self.codes.iter().position(|existing| existing == code) {
            Some(index) => {
                self.codes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Encodes the list for the `students.registered_courses` column.
    ///
    /// An empty list is stored as `NULL`.
    pub fn encode(&self) -> Option<String> {
        if self.codes.is_empty() {
            return None;
        }
        let separator = COURSE_LIST_SEPARATOR.to_string();
        Some(self.codes.join(separator.as_str()))
    }

    /// Decodes a persisted column value.
    ///
    /// `NULL` and the empty string both decode to an empty list.
    ///
    /// # Errors
    /// Returns a description of the first empty segment or duplicate code.
    pub fn decode(value: Option<&str>) -> Result<Self, String> {
        let Some(raw) = value.filter(|raw| !raw.is_empty()) else {
            return Ok(Self::new());
        };

        let mut courses = Self::new();
        for segment in raw.split(COURSE_LIST_SEPARATOR) {
            if segment.is_empty() {
                return Err(format!("empty course code in list `{raw}`"));
            }
            if !courses.insert(segment) {
                return Err(format!("duplicate course code `{segment}` in list `{raw}`"));
            }
        }
        Ok(courses)
    }
}

impl TryFrom<Vec<String>> for RegisteredCourses {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        let mut courses = Self::new();
        for code in value {
            if !courses.insert(code.clone()) {
                return Err(format!("duplicate course code `{code}`"));
            }
        }
        Ok(courses)
    }
}

impl From<RegisteredCourses> for Vec<String> {
    fn from(value: RegisteredCourses) -> Self {
        value.codes
    }
}

/// Directory entry for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Operator-supplied unique id.
    pub id: String,
    pub name: String,
    pub registered_courses: RegisteredCourses,
}

impl Student {
    /// Creates a student with no enrollments.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            registered_courses: RegisteredCourses::new(),
        }
    }

    /// Validates directory invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyStudentId);
        }
        for code in self.registered_courses.iter() {
            super::validate_course_code(code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisteredCourses, Student};
    use crate::model::ValidationError;

    #[test]
    fn insert_rejects_duplicates_and_keeps_order() {
        let mut courses = RegisteredCourses::new();
        assert!(courses.insert("IFM02A2"));
        assert!(courses.insert("IFM03B3"));
        assert!(!courses.insert("IFM02A2"));
        assert_eq!(courses.len(), 2);
        assert_eq!(courses.iter().collect::<Vec<_>>(), ["IFM02A2", "IFM03B3"]);
    }

    #[test]
    fn contains_does_not_match_substrings() {
        let mut courses = RegisteredCourses::new();
        courses.insert("IFM02A2X");
        assert!(!courses.contains("IFM02A2"));
        assert!(!courses.contains("02A2"));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut courses = RegisteredCourses::new();
        courses.insert("A");
        courses.insert("B");
        courses.insert("C");
        assert!(courses.remove("B"));
        assert!(!courses.remove("B"));
        assert_eq!(courses.len(), 2);
        assert_eq!(courses.iter().collect::<Vec<_>>(), ["A", "C"]);
    }

    #[test]
    fn empty_list_encodes_as_null() {
        assert_eq!(RegisteredCourses::new().encode(), None);
        assert!(RegisteredCourses::decode(None).unwrap().is_empty());
        assert!(RegisteredCourses::decode(Some("")).unwrap().is_empty());
    }

    #[test]
    fn encode_joins_with_separator() {
        let mut courses = RegisteredCourses::new();
        courses.insert("IFM02A2");
        courses.insert("IFM03B3");
        assert_eq!(courses.encode().as_deref(), Some("IFM02A2,IFM03B3"));
        assert_eq!(
            RegisteredCourses::decode(Some("IFM02A2,IFM03B3")).unwrap(),
            courses
        );
    }

    #[test]
    fn decode_rejects_corrupt_lists() {
        let duplicate = RegisteredCourses::decode(Some("A,B,A")).unwrap_err();
        assert!(duplicate.contains("duplicate"));

        let empty_segment = RegisteredCourses::decode(Some("A,,B")).unwrap_err();
        assert!(empty_segment.contains("empty"));
    }

    #[test]
    fn serde_uses_plain_sequence_and_rejects_duplicates() {
        let mut courses = RegisteredCourses::new();
        courses.insert("IFM02A2");
        let json = serde_json::to_string(&courses).unwrap();
        assert_eq!(json, r#"["IFM02A2"]"#);

        let err = serde_json::from_str::<RegisteredCourses>(r#"["A","A"]"#);
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_blank_id() {
        let student = Student::new(" ", "Nobody");
        assert_eq!(student.validate().unwrap_err(), ValidationError::EmptyStudentId);
    }
}
