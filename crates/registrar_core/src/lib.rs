//! Core domain logic for the course registration manager.
//! This crate owns the catalog/directory invariants and both workflows.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::Course;
pub use model::student::{RegisteredCourses, Student};
pub use model::ValidationError;
pub use repo::course_repo::{CourseCatalog, RepoError, RepoResult, SqliteCourseCatalog};
pub use repo::store::{RegistrationStore, SqliteRegistrationStore};
pub use repo::student_repo::{SqliteStudentDirectory, StudentDirectory};
pub use service::registration_service::{
    Confirmation, PendingRegistration, RegisterOutcome, RegistrationService,
    ResolvedRegistration, WorkflowError, WorkflowReceipt,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
