//! Course catalog contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup, listing and capacity adjustment over `courses`.
//! - Own the repository error type shared by catalog and directory.
//!
//! # Invariants
//! - `update_capacity` is relative and applied in a single statement.
//! - A capacity adjustment that would go negative is rejected, not clamped.

use crate::db::DbError;
use crate::model::course::Course;
use crate::model::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COURSE_SELECT_SQL: &str = "SELECT
    course_code,
    title,
    description,
    capacity,
    schedule
FROM courses";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog and directory operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation before write.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target course row does not exist.
    CourseNotFound(String),
    /// Adjustment would leave a negative seat count.
    CapacityExhausted {
        code: String,
        capacity: i64,
        delta: i64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::CourseNotFound(code) => write!(f, "course not found: {code}"),
            Self::CapacityExhausted {
                code,
                capacity,
                delta,
            } => write!(
                f,
                "cannot adjust capacity of course {code} by {delta}: only {capacity} seats left"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "registration store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Course Catalog contract used by registration workflows.
pub trait CourseCatalog {
    /// Gets one course by code.
    fn get_course(&self, code: &str) -> RepoResult<Option<Course>>;
    /// Lists every course ordered by code.
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    /// Adds `delta` seats to a course and returns the new capacity.
    fn update_capacity(&self, code: &str, delta: i64) -> RepoResult<i64>;
    /// Inserts a new catalog entry. Admin path; not reachable from the menu.
    fn create_course(&self, course: &Course) -> RepoResult<()>;
}

/// SQLite-backed course catalog.
pub struct SqliteCourseCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseCatalog for SqliteCourseCatalog<'_> {
    fn get_course(&self, code: &str) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE course_code = ?1;"))?;

        let mut rows = stmt.query([code])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }

        Ok(None)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} ORDER BY course_code ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();

        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }

        Ok(courses)
    }

    fn update_capacity(&self, code: &str, delta: i64) -> RepoResult<i64> {
        let updated: Option<i64> = self
            .conn
            .query_row(
                "UPDATE courses
                 SET capacity = capacity + ?2
                 WHERE course_code = ?1
                   AND capacity + ?2 >= 0
                 RETURNING capacity;",
                params![code, delta],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(capacity) = updated {
            return Ok(capacity);
        }

        match self.get_course(code)? {
            Some(course) => Err(RepoError::CapacityExhausted {
                code: course.code,
                capacity: course.capacity,
                delta,
            }),
            None => Err(RepoError::CourseNotFound(code.to_string())),
        }
    }

    fn create_course(&self, course: &Course) -> RepoResult<()> {
        course.validate()?;

        self.conn.execute(
            "INSERT INTO courses (
                course_code,
                title,
                description,
                capacity,
                schedule
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                course.code.as_str(),
                course.title.as_str(),
                course.description.as_str(),
                course.capacity,
                course.schedule.as_str(),
            ],
        )?;

        Ok(())
    }
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let course = Course {
        code: row.get("course_code")?,
        title: row.get("title")?,
        description: row.get("description")?,
        capacity: row.get("capacity")?,
        schedule: row.get("schedule")?,
    };
    course.validate().map_err(|err| {
        RepoError::InvalidData(format!("courses row `{}`: {err}", course.code))
    })?;
    Ok(course)
}
