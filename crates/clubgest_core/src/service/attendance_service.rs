//! Attendance gateway: the single entry point for attendance use-cases.
//!
//! # Responsibility
//! - Check that referenced players and sessions exist before any mutation.
//! - Distinguish first recording (`record_attendance`) from editing an
//!   existing recording (`update_attendance`), both backed by store `upsert`.
//! - Delegate statistics to `AttendanceAggregator`.
//!
//! # Invariants
//! - Referential checks run before the store is touched; a failed check
//!   leaves storage unchanged.
//! - The gateway never writes attendance fields itself, only through the store.
//! - Attendance rows are not deleted when players or sessions are; such
//!   orphans stay visible to statistics.

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatistics, PlayerAttendanceEntry, SessionAttendanceEntry,
};
use crate::model::player::PlayerId;
use crate::model::session::SessionId;
use crate::model::validation::{check_id, ValidationErrors};
use crate::repo::attendance_repo::AttendanceStore;
use crate::repo::player_repo::PlayerDirectory;
use crate::repo::session_repo::SessionDirectory;
use crate::repo::RepoError;
use crate::service::attendance_aggregator::AttendanceAggregator;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from attendance gateway operations.
#[derive(Debug)]
pub enum AttendanceServiceError {
    /// Referenced player does not exist.
    UnknownPlayer(PlayerId),
    /// Referenced session does not exist.
    UnknownSession(SessionId),
    /// No attendance record exists for the pair.
    UnknownAttendance {
        player_id: PlayerId,
        session_id: SessionId,
    },
    /// Malformed or out-of-range input.
    InvalidInput(ValidationErrors),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPlayer(id) => write!(f, "player not found: {id}"),
            Self::UnknownSession(id) => write!(f, "training session not found: {id}"),
            Self::UnknownAttendance {
                player_id,
                session_id,
            } => write!(
                f,
                "attendance not found for player {player_id} in session {session_id}"
            ),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::InvalidInput(errors),
            other => Self::Storage(other),
        }
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceServiceError>;

/// Attendance gateway over a store and the two roster directories.
pub struct AttendanceService<S, P, D>
where
    S: AttendanceStore,
    P: PlayerDirectory,
    D: SessionDirectory,
{
    store: S,
    players: P,
    sessions: D,
}

impl<S, P, D> AttendanceService<S, P, D>
where
    S: AttendanceStore,
    P: PlayerDirectory,
    D: SessionDirectory,
{
    pub fn new(store: S, players: P, sessions: D) -> Self {
        Self {
            store,
            players,
            sessions,
        }
    }

    /// Records attendance for a pair, creating or updating the record.
    pub fn record_attendance(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
        present: bool,
    ) -> AttendanceResult<AttendanceRecord> {
        ensure_valid_pair(player_id, session_id)?;
        self.ensure_player(player_id)?;
        self.ensure_session(session_id)?;

        let record = self.store.upsert(player_id, session_id, present)?;
        info!(
            "event=attendance_record module=service status=ok attendance_id={} player_id={} session_id={} present={}",
            record.id, player_id, session_id, present
        );
        Ok(record)
    }

    /// Changes `present` on an existing record.
    ///
    /// Fails with `UnknownAttendance` instead of creating a new record.
    pub fn update_attendance(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
        present: bool,
    ) -> AttendanceResult<AttendanceRecord> {
        ensure_valid_pair(player_id, session_id)?;
        self.ensure_player(player_id)?;
        self.ensure_session(session_id)?;
        self.ensure_attendance(player_id, session_id)?;

        let record = self.store.upsert(player_id, session_id, present)?;
        info!(
            "event=attendance_update module=service status=ok attendance_id={} player_id={} session_id={} present={}",
            record.id, player_id, session_id, present
        );
        Ok(record)
    }

    /// Removes an existing record; `UnknownAttendance` when there is none.
    pub fn remove_attendance(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
    ) -> AttendanceResult<()> {
        ensure_valid_pair(player_id, session_id)?;
        let record = self.ensure_attendance(player_id, session_id)?;

        let changed = self.store.remove(player_id, session_id)?;
        info!(
            "event=attendance_remove module=service status=ok attendance_id={} player_id={} session_id={} changed={}",
            record.id, player_id, session_id, changed
        );
        Ok(())
    }

    /// Attendance for one session, ordered by player name.
    pub fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> AttendanceResult<Vec<SessionAttendanceEntry>> {
        self.ensure_session(session_id)?;
        Ok(self.store.list_by_session(session_id)?)
    }

    /// Attendance for one player, most recent session first.
    pub fn list_for_player(
        &self,
        player_id: PlayerId,
    ) -> AttendanceResult<Vec<PlayerAttendanceEntry>> {
        self.ensure_player(player_id)?;
        Ok(self.store.list_by_player(player_id)?)
    }

    /// Statistics for one player; all zeros when nothing was recorded.
    pub fn statistics_for(&self, player_id: PlayerId) -> AttendanceResult<AttendanceStatistics> {
        self.ensure_player(player_id)?;
        let stats = AttendanceAggregator::new(&self.store).compute_for(player_id)?;
        debug!(
            "event=attendance_stats module=service status=ok player_id={} total={} present={}",
            player_id, stats.total_sessions, stats.present_count
        );
        Ok(stats)
    }

    fn ensure_player(&self, player_id: PlayerId) -> AttendanceResult<()> {
        match self.players.get_player(player_id)? {
            Some(_) => Ok(()),
            None => {
                debug!("event=attendance_guard module=service status=rejected reason=unknown_player player_id={player_id}");
                Err(AttendanceServiceError::UnknownPlayer(player_id))
            }
        }
    }

    fn ensure_session(&self, session_id: SessionId) -> AttendanceResult<()> {
        match self.sessions.get_session(session_id)? {
            Some(_) => Ok(()),
            None => {
                debug!("event=attendance_guard module=service status=rejected reason=unknown_session session_id={session_id}");
                Err(AttendanceServiceError::UnknownSession(session_id))
            }
        }
    }

    fn ensure_attendance(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
    ) -> AttendanceResult<AttendanceRecord> {
        self.store
            .find(player_id, session_id)?
            .ok_or(AttendanceServiceError::UnknownAttendance {
                player_id,
                session_id,
            })
    }
}

fn ensure_valid_pair(player_id: PlayerId, session_id: SessionId) -> AttendanceResult<()> {
    let mut errors = ValidationErrors::new();
    check_id(&mut errors, "playerId", player_id);
    check_id(&mut errors, "sessionId", session_id);
    errors
        .into_result()
        .map_err(AttendanceServiceError::InvalidInput)
}
