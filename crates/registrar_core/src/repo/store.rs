//! Transactional registration store.
//!
//! # Responsibility
//! - Combine the Course Catalog and Student Directory over one connection.
//! - Run a workflow's reads and writes as one immediate transaction.
//!
//! # Invariants
//! - Work passed to `atomically` either commits fully or leaves no trace.
//! - The store only accepts connections migrated to the latest version.

use crate::db::migrations::latest_version;
use crate::model::course::Course;
use crate::model::student::Student;
use crate::repo::course_repo::{CourseCatalog, RepoError, RepoResult, SqliteCourseCatalog};
use crate::repo::student_repo::{SqliteStudentDirectory, StudentDirectory};
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Storage used by registration workflows.
///
/// Implementations must make `atomically` all-or-nothing with respect to
/// every catalog and directory call issued through the `store` argument.
pub trait RegistrationStore: CourseCatalog + StudentDirectory + Sized {
    /// Runs `work` inside one transaction; commits on `Ok`, rolls back on `Err`.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed store sharing one borrowed connection.
pub struct SqliteRegistrationStore<'conn> {
    conn: &'conn Connection,
    courses: SqliteCourseCatalog<'conn>,
    students: SqliteStudentDirectory<'conn>,
}

impl<'conn> SqliteRegistrationStore<'conn> {
    /// Creates a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            courses: SqliteCourseCatalog::new(conn),
            students: SqliteStudentDirectory::new(conn),
        })
    }
}

impl CourseCatalog for SqliteRegistrationStore<'_> {
    fn get_course(&self, code: &str) -> RepoResult<Option<Course>> {
        self.courses.get_course(code)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        self.courses.list_courses()
    }

    fn update_capacity(&self, code: &str, delta: i64) -> RepoResult<i64> {
        self.courses.update_capacity(code, delta)
    }

    fn create_course(&self, course: &Course) -> RepoResult<()> {
        self.courses.create_course(course)
    }
}

impl StudentDirectory for SqliteRegistrationStore<'_> {
    fn get_student(&self, id: &str) -> RepoResult<Option<Student>> {
        self.students.get_student(id)
    }

    fn put_student(&self, student: &Student) -> RepoResult<()> {
        self.students.put_student(student)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        self.students.list_students()
    }
}

impl RegistrationStore for SqliteRegistrationStore<'_> {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        // Immediate takes the write lock up front so the checks and the
        // writes of one workflow see the same state.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|err| E::from(RepoError::from(err)))?;

        match work(self) {
            Ok(value) => {
                tx.commit().map_err(|err| E::from(RepoError::from(err)))?;
                Ok(value)
            }
            Err(err) => {
                debug!("event=store_tx module=repo status=rolled_back");
                drop(tx);
                Err(err)
            }
        }
    }
}
