//! Roster use-case service for players and training sessions.
//!
//! # Responsibility
//! - Validate and persist roster entries.
//! - Turn missing rows into typed not-found errors.
//!
//! # Invariants
//! - Updating or deleting roster entries leaves attendance rows untouched.

use crate::model::player::{NewPlayer, Player, PlayerId};
use crate::model::session::{NewTrainingSession, SessionId, TrainingSession};
use crate::model::validation::ValidationErrors;
use crate::repo::player_repo::PlayerRepository;
use crate::repo::session_repo::SessionRepository;
use crate::repo::RepoError;
use chrono::{Local, NaiveDate};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from roster operations.
#[derive(Debug)]
pub enum RosterServiceError {
    InvalidInput(ValidationErrors),
    PlayerNotFound(PlayerId),
    SessionNotFound(SessionId),
    Storage(RepoError),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::PlayerNotFound(id) => write!(f, "player not found: {id}"),
            Self::SessionNotFound(id) => write!(f, "training session not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::InvalidInput(errors),
            other => Self::Storage(other),
        }
    }
}

pub type RosterResult<T> = Result<T, RosterServiceError>;

/// Roster facade over player and session repositories.
pub struct RosterService<P: PlayerRepository, D: SessionRepository> {
    players: P,
    sessions: D,
}

impl<P: PlayerRepository, D: SessionRepository> RosterService<P, D> {
    pub fn new(players: P, sessions: D) -> Self {
        Self { players, sessions }
    }

    /// Creates a player, rejecting birth dates after today's local date.
    pub fn create_player(&self, player: &NewPlayer) -> RosterResult<Player> {
        self.create_player_at(player, Local::now().date_naive())
    }

    /// Same as `create_player` with an explicit reference date.
    pub fn create_player_at(&self, player: &NewPlayer, today: NaiveDate) -> RosterResult<Player> {
        let created = self.players.create_player(player, today)?;
        info!(
            "event=player_create module=service status=ok player_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_player(&self, id: PlayerId) -> RosterResult<Player> {
        self.players
            .get_player(id)?
            .ok_or(RosterServiceError::PlayerNotFound(id))
    }

    /// Replaces every field of a player, with the same checks as creation.
    pub fn update_player(&self, id: PlayerId, player: &NewPlayer) -> RosterResult<Player> {
        self.update_player_at(id, player, Local::now().date_naive())
    }

    pub fn update_player_at(
        &self,
        id: PlayerId,
        player: &NewPlayer,
        today: NaiveDate,
    ) -> RosterResult<Player> {
        let updated = self
            .players
            .update_player(id, player, today)?
            .ok_or(RosterServiceError::PlayerNotFound(id))?;
        info!("event=player_update module=service status=ok player_id={id}");
        Ok(updated)
    }

    pub fn list_players(&self) -> RosterResult<Vec<Player>> {
        Ok(self.players.list_players()?)
    }

    pub fn delete_player(&self, id: PlayerId) -> RosterResult<()> {
        if self.players.delete_player(id)? == 0 {
            return Err(RosterServiceError::PlayerNotFound(id));
        }
        info!("event=player_delete module=service status=ok player_id={id}");
        Ok(())
    }

    pub fn create_session(&self, session: &NewTrainingSession) -> RosterResult<TrainingSession> {
        let created = self.sessions.create_session(session)?;
        info!(
            "event=session_create module=service status=ok session_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_session(&self, id: SessionId) -> RosterResult<TrainingSession> {
        self.sessions
            .get_session(id)?
            .ok_or(RosterServiceError::SessionNotFound(id))
    }

    pub fn update_session(
        &self,
        id: SessionId,
        session: &NewTrainingSession,
    ) -> RosterResult<TrainingSession> {
        let updated = self
            .sessions
            .update_session(id, session)?
            .ok_or(RosterServiceError::SessionNotFound(id))?;
        info!("event=session_update module=service status=ok session_id={id}");
        Ok(updated)
    }

    /// Flips only the active flag, leaving the rest of the session as is.
    pub fn set_session_active(
        &self,
        id: SessionId,
        active: bool,
    ) -> RosterResult<TrainingSession> {
        let updated = self
            .sessions
            .set_session_active(id, active)?
            .ok_or(RosterServiceError::SessionNotFound(id))?;
        info!("event=session_set_active module=service status=ok session_id={id} active={active}");
        Ok(updated)
    }

    pub fn list_sessions(&self) -> RosterResult<Vec<TrainingSession>> {
        Ok(self.sessions.list_sessions()?)
    }

    pub fn delete_session(&self, id: SessionId) -> RosterResult<()> {
        if self.sessions.delete_session(id)? == 0 {
            return Err(RosterServiceError::SessionNotFound(id));
        }
        info!("event=session_delete module=service status=ok session_id={id}");
        Ok(())
    }
}
