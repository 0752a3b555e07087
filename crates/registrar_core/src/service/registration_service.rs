//! Registration and drop workflows.
//!
//! # Responsibility
//! - Validate a registration against course capacity and the student's list.
//! - Apply the student write and the capacity write of one workflow together.
//! - Hand missing-student cases back to the caller as a pending registration.
//!
//! # Invariants
//! - Every failure path leaves both collections untouched.
//! - A successful registration appends exactly one code and takes one seat.
//! - A successful drop removes exactly one code and returns at most one seat.
//! - A pending registration is re-validated from the top when resumed.

use crate::model::course::Course;
use crate::model::student::Student;
use crate::repo::course_repo::RepoError;
use crate::repo::store::RegistrationStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by registration workflows.
///
/// `Display` renders the operator-facing message.
#[derive(Debug)]
pub enum WorkflowError {
    /// A required identifier was blank after trim.
    InvalidInput(&'static str),
    /// No course with the requested code.
    CourseNotFound(String),
    /// Course has no remaining seats.
    CourseFull(String),
    /// Student already holds the course in their list.
    AlreadyRegistered {
        student_id: String,
        course_code: String,
    },
    /// No student with the requested id.
    StudentNotFound(String),
    /// Student does not hold the course in their list.
    NotRegistered {
        student_id: String,
        course_code: String,
    },
    /// Operator declined to create the missing student.
    Cancelled,
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(field) => write!(f, "{field} must not be blank."),
            Self::CourseNotFound(_) => write!(f, "Course not found."),
            Self::CourseFull(_) => write!(f, "Course is full."),
            Self::AlreadyRegistered { .. } => {
                write!(f, "Student is already registered for this course.")
            }
            Self::StudentNotFound(_) => write!(f, "Student not found."),
            Self::NotRegistered { .. } => {
                write!(f, "Student is not registered for this course.")
            }
            Self::Cancelled => write!(f, "Registration canceled."),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent registration state: {details}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkflowError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CourseNotFound(code) => Self::CourseNotFound(code),
            RepoError::CapacityExhausted { code, .. } => Self::CourseFull(code),
            other => Self::Repo(other),
        }
    }
}

impl WorkflowError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::CourseNotFound(_) => "course_not_found",
            Self::CourseFull(_) => "course_full",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::StudentNotFound(_) => "student_not_found",
            Self::NotRegistered { .. } => "not_registered",
            Self::Cancelled => "cancelled",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::Repo(_) => "storage_error",
        }
    }
}

/// Result of a committed registration or drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReceipt {
    pub student_id: String,
    pub course_code: String,
    /// Seats left after the workflow. `None` when the course row was gone
    /// at drop time and no seat was returned.
    pub course_capacity: Option<i64>,
}

/// Registration that is waiting for the operator to create the student.
///
/// Only produced by [`RegistrationService::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    student_id: String,
    course_code: String,
}

impl PendingRegistration {
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }
}

/// Successful outcomes of the registration workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Student list and course capacity were both updated.
    Registered(WorkflowReceipt),
    /// Course checks passed but the student does not exist yet.
    NeedsConfirmation(PendingRegistration),
}

/// Operator answer to a pending registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Create the student with this name, then retry the registration.
    CreateStudent { name: String },
    /// Abandon the registration.
    Decline,
}

/// Report of a confirmed pending registration.
#[derive(Debug)]
pub struct ResolvedRegistration {
    /// Whether this call inserted the student row.
    pub student_created: bool,
    /// Result of the full re-run of the registration.
    pub registration: Result<WorkflowReceipt, WorkflowError>,
}

/// Registration service facade over a transactional store.
pub struct RegistrationService<S: RegistrationStore> {
    store: S,
}

impl<S: RegistrationStore> RegistrationService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists the catalog for display.
    pub fn list_courses(&self) -> Result<Vec<Course>, WorkflowError> {
        Ok(self.store.list_courses()?)
    }

    /// Registers `student_id` for `course_code`.
    ///
    /// # Contract
    /// - Course existence and capacity are checked before the student.
    /// - Missing student yields `NeedsConfirmation` with no mutation.
    /// - On success the student write and the capacity write commit together.
    pub fn register(
        &self,
        student_id: &str,
        course_code: &str,
    ) -> Result<RegisterOutcome, WorkflowError> {
        let student_id = normalize_required(student_id, "Student ID")?;
        let course_code = normalize_required(course_code, "Course code")?;

        let result = self.store.atomically(|store| -> Result<_, WorkflowError> {
            let course = store
                .get_course(&course_code)?
                .ok_or_else(|| WorkflowError::CourseNotFound(course_code.clone()))?;
            if !course.has_open_seat() {
                return Err(WorkflowError::CourseFull(course.code));
            }

            let Some(mut student) = store.get_student(&student_id)? else {
                return Ok(RegisterOutcome::NeedsConfirmation(PendingRegistration {
                    student_id: student_id.clone(),
                    course_code: course_code.clone(),
                }));
            };

            if !student.registered_courses.insert(course_code.as_str()) {
                return Err(WorkflowError::AlreadyRegistered {
                    student_id: student_id.clone(),
                    course_code: course_code.clone(),
                });
            }

            store.put_student(&student)?;
            let capacity = store.update_capacity(&course_code, -1)?;
            Ok(RegisterOutcome::Registered(WorkflowReceipt {
                student_id: student_id.clone(),
                course_code: course_code.clone(),
                course_capacity: Some(capacity),
            }))
        });

        match &result {
            Ok(RegisterOutcome::Registered(receipt)) => info!(
                "event=course_register module=service status=ok student_id={} course_code={} capacity={}",
                receipt.student_id,
                receipt.course_code,
                receipt.course_capacity.unwrap_or_default()
            ),
            Ok(RegisterOutcome::NeedsConfirmation(_)) => info!(
                "event=course_register module=service status=pending student_id={student_id} course_code={course_code} reason=student_not_found"
            ),
            Err(err) => log_rejection("course_register", &student_id, &course_code, err),
        }

        result
    }

    /// Resolves a pending registration with the operator's answer.
    ///
    /// # Contract
    /// - `Decline` returns `Cancelled` and writes nothing.
    /// - `CreateStudent` commits the new student first, then runs the full
    ///   registration again; a later rejection keeps the created student.
    /// - `Err` means the retry never ran. Once the student step commits,
    ///   the retry result is reported inside `ResolvedRegistration`.
    pub fn resolve_pending(
        &self,
        pending: PendingRegistration,
        confirmation: Confirmation,
    ) -> Result<ResolvedRegistration, WorkflowError> {
        let name = match confirmation {
            Confirmation::Decline => {
                info!(
                    "event=course_register module=service status=cancelled student_id={} course_code={}",
                    pending.student_id, pending.course_code
                );
                return Err(WorkflowError::Cancelled);
            }
            Confirmation::CreateStudent { name } => name,
        };

        let student_created = self.store.atomically(|store| -> Result<bool, WorkflowError> {
            if store.get_student(&pending.student_id)?.is_some() {
                return Ok(false);
            }
            store.put_student(&Student::new(pending.student_id.as_str(), name.trim()))?;
            Ok(true)
        })?;
        if student_created {
            info!(
                "event=student_create module=service status=ok student_id={}",
                pending.student_id
            );
        }

        let registration = match self.register(&pending.student_id, &pending.course_code) {
            Ok(RegisterOutcome::Registered(receipt)) => Ok(receipt),
            Ok(RegisterOutcome::NeedsConfirmation(_)) => Err(WorkflowError::InconsistentState(
                "created student not found on retry",
            )),
            Err(err) => Err(err),
        };

        Ok(ResolvedRegistration {
            student_created,
            registration,
        })
    }

    /// Drops `course_code` from `student_id`'s list and returns the seat.
    ///
    /// # Contract
    /// - Only the student's list is checked; the course is not required to
    ///   exist. When it is gone the removal still commits, no seat is
    ///   returned, and the receipt capacity is `None`.
    pub fn drop_course(
        &self,
        student_id: &str,
        course_code: &str,
    ) -> Result<WorkflowReceipt, WorkflowError> {
        let student_id = normalize_required(student_id, "Student ID")?;
        let course_code = normalize_required(course_code, "Course code")?;

        let result = self.store.atomically(|store| -> Result<_, WorkflowError> {
            let mut student = store
                .get_student(&student_id)?
                .ok_or_else(|| WorkflowError::StudentNotFound(student_id.clone()))?;

            if !student.registered_courses.remove(&course_code) {
                return Err(WorkflowError::NotRegistered {
                    student_id: student_id.clone(),
                    course_code: course_code.clone(),
                });
            }

            store.put_student(&student)?;
            let course_capacity = match store.update_capacity(&course_code, 1) {
                Ok(capacity) => Some(capacity),
                Err(RepoError::CourseNotFound(_)) => {
                    warn!(
                        "event=course_drop module=service status=degraded student_id={student_id} course_code={course_code} reason=course_missing"
                    );
                    None
                }
                Err(other) => return Err(other.into()),
            };

            Ok(WorkflowReceipt {
                student_id: student_id.clone(),
                course_code: course_code.clone(),
                course_capacity,
            })
        });

        match &result {
            Ok(receipt) => info!(
                "event=course_drop module=service status=ok student_id={} course_code={}",
                receipt.student_id, receipt.course_code
            ),
            Err(err) => log_rejection("course_drop", &student_id, &course_code, err),
        }

        result
    }
}

fn normalize_required(value: &str, field: &'static str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::InvalidInput(field));
    }
    Ok(trimmed.to_string())
}

fn log_rejection(event: &str, student_id: &str, course_code: &str, err: &WorkflowError) {
    match err {
        WorkflowError::Repo(_) | WorkflowError::InconsistentState(_) => warn!(
            "event={event} module=service status=error student_id={student_id} course_code={course_code} error_code={} error={err}",
            err.code()
        ),
        _ => info!(
            "event={event} module=service status=rejected student_id={student_id} course_code={course_code} reason={}",
            err.code()
        ),
    }
}
