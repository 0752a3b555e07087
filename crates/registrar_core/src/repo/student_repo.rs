//! Student directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup and upsert over `students`.
//! - Encode/decode `RegisteredCourses` for the `registered_courses` column.
//!
//! # Invariants
//! - `put_student` replaces the whole record for its id.
//! - A stored list with duplicates or empty codes is reported, never repaired.

use crate::model::student::{RegisteredCourses, Student};
use crate::repo::course_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    student_id,
    name,
    registered_courses
FROM students";

/// Student Directory contract used by registration workflows.
pub trait StudentDirectory {
    /// Gets one student by id.
    fn get_student(&self, id: &str) -> RepoResult<Option<Student>>;
    /// Inserts or replaces a student record by id.
    fn put_student(&self, student: &Student) -> RepoResult<()>;
    /// Lists every student ordered by id.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student directory.
pub struct SqliteStudentDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StudentDirectory for SqliteStudentDirectory<'_> {
    fn get_student(&self, id: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE student_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn put_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (student_id, name, registered_courses)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(student_id) DO UPDATE SET
                name = excluded.name,
                registered_courses = excluded.registered_courses;",
            params![
                student.id.as_str(),
                student.name.as_str(),
                student.registered_courses.encode(),
            ],
        )?;

        Ok(())
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY student_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: String = row.get("student_id")?;
    let encoded: Option<String> = row.get("registered_courses")?;
    let registered_courses = RegisteredCourses::decode(encoded.as_deref()).map_err(|message| {
        RepoError::InvalidData(format!("students.registered_courses for `{id}`: {message}"))
    })?;

    Ok(Student {
        id,
        name: row.get("name")?,
        registered_courses,
    })
}
