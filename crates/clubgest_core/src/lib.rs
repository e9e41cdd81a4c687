//! Core domain logic for ClubGest.
//! This crate is the single source of truth for roster and attendance
//! invariants; transport layers only translate in and out of it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{
    present_percentage, AttendanceId, AttendanceRecord, AttendanceStatistics, AttendanceTally,
    PlayerAttendanceEntry, SessionAttendanceEntry,
};
pub use model::player::{NewPlayer, Player, PlayerId};
pub use model::session::{NewTrainingSession, SessionId, SessionKind, TrainingSession};
pub use model::validation::{FieldError, ValidationErrors};
pub use repo::attendance_repo::{AttendanceStore, SqliteAttendanceStore};
pub use repo::player_repo::{PlayerDirectory, PlayerRepository, SqlitePlayerRepository};
pub use repo::session_repo::{SessionDirectory, SessionRepository, SqliteSessionRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance_aggregator::AttendanceAggregator;
pub use service::attendance_service::{
    AttendanceResult, AttendanceService, AttendanceServiceError,
};
pub use service::roster_service::{RosterResult, RosterService, RosterServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
