use registrar_core::db::open_db_in_memory;
use registrar_core::{
    Confirmation, Course, CourseCatalog, RegisterOutcome, RegistrationService,
    SqliteRegistrationStore, Student, StudentDirectory, WorkflowError, WorkflowReceipt,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> RegistrationService<SqliteRegistrationStore<'_>> {
    RegistrationService::new(SqliteRegistrationStore::try_new(conn).unwrap())
}

fn capacity(service: &RegistrationService<SqliteRegistrationStore<'_>>, code: &str) -> i64 {
    service.store().get_course(code).unwrap().unwrap().capacity
}

fn courses_of(
    service: &RegistrationService<SqliteRegistrationStore<'_>>,
    student_id: &str,
) -> Vec<String> {
    service
        .store()
        .get_student(student_id)
        .unwrap()
        .unwrap()
        .registered_courses
        .iter()
        .map(str::to_string)
        .collect()
}

fn add_student(service: &RegistrationService<SqliteRegistrationStore<'_>>, id: &str) {
    service
        .store()
        .put_student(&Student::new(id, format!("Student {id}")))
        .unwrap();
}

#[test]
fn seeded_course_register_twice_then_drop_scenario() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");

    let outcome = service.register("S1", "IFM02A2").unwrap();
    assert_eq!(
        outcome,
        RegisterOutcome::Registered(WorkflowReceipt {
            student_id: "S1".to_string(),
            course_code: "IFM02A2".to_string(),
            course_capacity: Some(29),
        })
    );
    assert_eq!(capacity(&service, "IFM02A2"), 29);
    assert_eq!(courses_of(&service, "S1"), ["IFM02A2"]);

    let err = service.register("S1", "IFM02A2").unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyRegistered { .. }));
    assert_eq!(capacity(&service, "IFM02A2"), 29);
    assert_eq!(courses_of(&service, "S1"), ["IFM02A2"]);

    let receipt = service.drop_course("S1", "IFM02A2").unwrap();
    assert_eq!(receipt.course_capacity, Some(30));
    assert_eq!(capacity(&service, "IFM02A2"), 30);
    assert!(courses_of(&service, "S1").is_empty());
}

#[test]
fn unknown_course_is_rejected_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.register("Sx", "NOPE").unwrap_err();
    assert!(matches!(err, WorkflowError::CourseNotFound(code) if code == "NOPE"));
    assert!(service.store().get_student("Sx").unwrap().is_none());
    assert_eq!(capacity(&service, "IFM02A2"), 30);
    assert_eq!(capacity(&service, "IFM03B3"), 25);
}

#[test]
fn full_course_is_rejected_and_stays_at_zero() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .store()
        .create_course(&Course::new("SEM900", "Seminar", "Closed.", 0, "M 18:00"))
        .unwrap();
    add_student(&service, "S1");

    let err = service.register("S1", "SEM900").unwrap_err();
    assert!(matches!(err, WorkflowError::CourseFull(_)));
    assert_eq!(capacity(&service, "SEM900"), 0);
    assert!(courses_of(&service, "S1").is_empty());

    // Course checks run before the student lookup.
    let err = service.register("Unknown", "SEM900").unwrap_err();
    assert!(matches!(err, WorkflowError::CourseFull(_)));
}

#[test]
fn last_seat_is_taken_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .store()
        .create_course(&Course::new("TUT1", "Tutorial", "One seat.", 1, "W 12:00"))
        .unwrap();
    add_student(&service, "S1");
    add_student(&service, "S2");

    service.register("S1", "TUT1").unwrap();
    let err = service.register("S2", "TUT1").unwrap_err();

    assert!(matches!(err, WorkflowError::CourseFull(_)));
    assert_eq!(capacity(&service, "TUT1"), 0);
    assert!(courses_of(&service, "S2").is_empty());
}

#[test]
fn registrations_append_in_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");

    service.register("S1", "IFM03B3").unwrap();
    service.register("S1", "IFM02A2").unwrap();

    assert_eq!(courses_of(&service, "S1"), ["IFM03B3", "IFM02A2"]);
    assert_eq!(capacity(&service, "IFM03B3"), 24);
    assert_eq!(capacity(&service, "IFM02A2"), 29);
}

#[test]
fn registered_code_prefix_does_not_block_registration() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .store()
        .create_course(&Course::new("IFM02A2X", "Extension", "Extra.", 10, "Sa 09:00"))
        .unwrap();
    add_student(&service, "S1");

    service.register("S1", "IFM02A2X").unwrap();
    service.register("S1", "IFM02A2").unwrap();

    assert_eq!(courses_of(&service, "S1"), ["IFM02A2X", "IFM02A2"]);
}

#[test]
fn inputs_are_trimmed_and_blank_inputs_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");

    service.register("  S1 ", " IFM02A2\t").unwrap();
    assert_eq!(courses_of(&service, "S1"), ["IFM02A2"]);

    let err = service.register("   ", "IFM02A2").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput("Student ID")));
    let err = service.drop_course("S1", "").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput("Course code")));
}

#[test]
fn missing_student_needs_confirmation_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let outcome = service.register("S2", "IFM03B3").unwrap();
    let RegisterOutcome::NeedsConfirmation(pending) = outcome else {
        panic!("expected pending registration");
    };
    assert_eq!(pending.student_id(), "S2");
    assert_eq!(pending.course_code(), "IFM03B3");
    assert!(service.store().get_student("S2").unwrap().is_none());
    assert_eq!(capacity(&service, "IFM03B3"), 25);
}

#[test]
fn declining_pending_registration_cancels() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let RegisterOutcome::NeedsConfirmation(pending) = service.register("S2", "IFM03B3").unwrap()
    else {
        panic!("expected pending registration");
    };
    let err = service
        .resolve_pending(pending, Confirmation::Decline)
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Cancelled));
    assert!(service.store().list_students().unwrap().is_empty());
    assert_eq!(capacity(&service, "IFM03B3"), 25);
}

#[test]
fn confirming_pending_registration_creates_student_and_registers() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let RegisterOutcome::NeedsConfirmation(pending) = service.register("S2", "IFM03B3").unwrap()
    else {
        panic!("expected pending registration");
    };
    let resolved = service
        .resolve_pending(
            pending,
            Confirmation::CreateStudent {
                name: " Grace ".to_string(),
            },
        )
        .unwrap();

    assert!(resolved.student_created);
    assert!(matches!(
        resolved.registration,
        Ok(WorkflowReceipt {
            course_capacity: Some(24),
            ..
        })
    ));
    let student = service.store().get_student("S2").unwrap().unwrap();
    assert_eq!(student.name, "Grace");
    assert_eq!(courses_of(&service, "S2"), ["IFM03B3"]);
}

#[test]
fn confirmed_retry_revalidates_course_from_scratch() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .store()
        .create_course(&Course::new("TUT1", "Tutorial", "One seat.", 1, "W 12:00"))
        .unwrap();
    add_student(&service, "S1");

    let RegisterOutcome::NeedsConfirmation(pending) = service.register("S2", "TUT1").unwrap()
    else {
        panic!("expected pending registration");
    };
    service.register("S1", "TUT1").unwrap();

    let resolved = service
        .resolve_pending(
            pending,
            Confirmation::CreateStudent {
                name: "Late".to_string(),
            },
        )
        .unwrap();

    assert!(resolved.student_created);
    assert!(matches!(resolved.registration, Err(WorkflowError::CourseFull(_))));
    assert!(courses_of(&service, "S2").is_empty());
    assert_eq!(capacity(&service, "TUT1"), 0);
}

#[test]
fn drop_without_registration_is_rejected_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");
    service.register("S1", "IFM03B3").unwrap();

    let err = service.drop_course("S1", "IFM02A2").unwrap_err();
    assert!(matches!(err, WorkflowError::NotRegistered { .. }));
    assert_eq!(courses_of(&service, "S1"), ["IFM03B3"]);
    assert_eq!(capacity(&service, "IFM02A2"), 30);
    assert_eq!(capacity(&service, "IFM03B3"), 24);
}

#[test]
fn drop_for_unknown_student_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.drop_course("Ghost", "IFM02A2").unwrap_err();
    assert!(matches!(err, WorkflowError::StudentNotFound(id) if id == "Ghost"));
    assert_eq!(capacity(&service, "IFM02A2"), 30);
}

#[test]
fn drop_keeps_other_registrations_in_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .store()
        .create_course(&Course::new("LAB101", "Lab", "Lab work.", 8, "F 08:00"))
        .unwrap();
    add_student(&service, "S1");
    service.register("S1", "IFM02A2").unwrap();
    service.register("S1", "IFM03B3").unwrap();
    service.register("S1", "LAB101").unwrap();

    service.drop_course("S1", "IFM03B3").unwrap();

    assert_eq!(courses_of(&service, "S1"), ["IFM02A2", "LAB101"]);
    assert_eq!(capacity(&service, "IFM03B3"), 25);
}

#[test]
fn drop_of_deleted_course_removes_membership_without_seat() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");
    service.register("S1", "IFM02A2").unwrap();
    conn.execute("DELETE FROM courses WHERE course_code = 'IFM02A2';", [])
        .unwrap();

    let receipt = service.drop_course("S1", "IFM02A2").unwrap();

    assert_eq!(receipt.course_capacity, None);
    assert!(courses_of(&service, "S1").is_empty());
    assert!(service.store().get_course("IFM02A2").unwrap().is_none());
}

#[test]
fn list_courses_reflects_capacity_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    add_student(&service, "S1");
    service.register("S1", "IFM03B3").unwrap();

    let courses = service.list_courses().unwrap();
    let data_structures = courses
        .iter()
        .find(|course| course.code == "IFM03B3")
        .unwrap();
    assert_eq!(data_structures.capacity, 24);
}

#[test]
fn confirming_after_student_appeared_reports_no_creation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let RegisterOutcome::NeedsConfirmation(pending) = service.register("S3", "IFM02A2").unwrap()
    else {
        panic!("expected pending registration");
    };
    service
        .store()
        .put_student(&Student::new("S3", "Existing"))
        .unwrap();

    let resolved = service
        .resolve_pending(
            pending,
            Confirmation::CreateStudent {
                name: "Other".to_string(),
            },
        )
        .unwrap();

    assert!(!resolved.student_created);
    assert!(resolved.registration.is_ok());
    let student = service.store().get_student("S3").unwrap().unwrap();
    assert_eq!(student.name, "Existing");
    assert_eq!(courses_of(&service, "S3"), ["IFM02A2"]);
}
