//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce cross-entity rules (attendance referential integrity) above the
//!   repositories.
//! - Keep the HTTP layer decoupled from storage details.

pub mod attendance_aggregator;
pub mod attendance_service;
pub mod roster_service;
