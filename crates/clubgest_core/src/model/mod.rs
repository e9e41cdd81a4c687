//! Domain model for the club roster and the attendance relation.
//!
//! # Responsibility
//! - Define the records exchanged between repositories, services and callers.
//! - Own field-level validation rules for roster input.
//!
//! # Invariants
//! - Every persisted entity is identified by a positive integer id assigned
//!   by storage.
//! - Attendance statistics are derived values and never persisted.

pub mod attendance;
pub mod player;
pub mod session;
pub mod validation;
