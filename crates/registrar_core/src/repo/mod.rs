//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the Course Catalog and Student Directory access contracts.
//! - Isolate SQL and column encodings from workflow orchestration.
//! - Provide a transactional store so one workflow commits as a unit.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Capacity adjustments never drive a course below zero seats.

pub mod course_repo;
pub mod store;
pub mod student_repo;
