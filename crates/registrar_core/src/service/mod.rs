//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate catalog and directory calls into registration workflows.
//! - Keep the menu layer decoupled from storage details.

pub mod registration_service;
