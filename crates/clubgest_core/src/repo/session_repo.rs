//! Training session directory contracts and SQLite implementation.
//!
//! # Invariants
//! - `starts_at` is stored as `YYYY-MM-DDTHH:MM:SS` text so lexical order is
//!   chronological order.
//! - Updating or deleting a session never touches attendance rows.

use crate::model::session::{NewTrainingSession, SessionId, SessionKind, TrainingSession};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

const SESSION_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    starts_at,
    duration_minutes,
    location,
    kind,
    active
FROM sessions";

const STARTS_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Read-only session lookup used by the attendance gateway.
pub trait SessionDirectory {
    fn get_session(&self, id: SessionId) -> RepoResult<Option<TrainingSession>>;
}

/// Full roster persistence for training sessions.
pub trait SessionRepository: SessionDirectory {
    fn create_session(&self, session: &NewTrainingSession) -> RepoResult<TrainingSession>;
    /// Replaces every field of a session; `None` when `id` is unknown.
    fn update_session(
        &self,
        id: SessionId,
        session: &NewTrainingSession,
    ) -> RepoResult<Option<TrainingSession>>;
    fn set_session_active(
        &self,
        id: SessionId,
        active: bool,
    ) -> RepoResult<Option<TrainingSession>>;
    /// All sessions, most recent first.
    fn list_sessions(&self) -> RepoResult<Vec<TrainingSession>>;
    fn delete_session(&self, id: SessionId) -> RepoResult<usize>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionDirectory for SqliteSessionRepository<'_> {
    fn get_session(&self, id: SessionId) -> RepoResult<Option<TrainingSession>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_row(row)?));
        }
        Ok(None)
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(&self, session: &NewTrainingSession) -> RepoResult<TrainingSession> {
        let session = session.normalized();
        session.validate()?;

        let id: SessionId = self.conn.query_row(
            "INSERT INTO sessions (
                name,
                description,
                starts_at,
                duration_minutes,
                location,
                kind,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id;",
            params![
                session.name.as_str(),
                session.description.as_deref(),
                format_datetime(&session.starts_at),
                session.duration_minutes,
                session.location.as_deref(),
                session.kind.map(SessionKind::as_str),
                bool_to_int(session.active),
            ],
            |row| row.get(0),
        )?;

        self.get_session(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("session {id} missing right after insert"))
        })
    }

    fn update_session(
        &self,
        id: SessionId,
        session: &NewTrainingSession,
    ) -> RepoResult<Option<TrainingSession>> {
        let session = session.normalized();
        session.validate()?;

        let changed = self.conn.execute(
            "UPDATE sessions
             SET name = ?1,
                 description = ?2,
                 starts_at = ?3,
                 duration_minutes = ?4,
                 location = ?5,
                 kind = ?6,
                 active = ?7
             WHERE id = ?8;",
            params![
                session.name.as_str(),
                session.description.as_deref(),
                format_datetime(&session.starts_at),
                session.duration_minutes,
                session.location.as_deref(),
                session.kind.map(SessionKind::as_str),
                bool_to_int(session.active),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_session(id)
    }

    fn set_session_active(
        &self,
        id: SessionId,
        active: bool,
    ) -> RepoResult<Option<TrainingSession>> {
        let changed = self.conn.execute(
            "UPDATE sessions SET active = ?1 WHERE id = ?2;",
            params![bool_to_int(active), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_session(id)
    }

    fn list_sessions(&self) -> RepoResult<Vec<TrainingSession>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SESSION_SELECT_SQL} ORDER BY starts_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }
        Ok(sessions)
    }

    fn delete_session(&self, id: SessionId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1;", [id])?;
        Ok(changed)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<TrainingSession> {
    let starts_at: String = row.get("starts_at")?;
    let duration_minutes = match row.get::<_, Option<i64>>("duration_minutes")? {
        Some(minutes) => Some(u16::try_from(minutes).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid duration `{minutes}` in sessions.duration_minutes"
            ))
        })?),
        None => None,
    };

    Ok(TrainingSession {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        starts_at: parse_datetime(&starts_at, "sessions.starts_at")?,
        duration_minutes,
        location: row.get("location")?,
        kind: parse_kind(row.get("kind")?)?,
        active: int_to_bool(row.get("active")?, "sessions.active")?,
    })
}

fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(STARTS_AT_FORMAT).to_string()
}

pub(crate) fn parse_datetime(value: &str, column: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, STARTS_AT_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid datetime `{value}` in {column}")))
}

pub(crate) fn parse_kind(value: Option<String>) -> RepoResult<Option<SessionKind>> {
    match value {
        Some(text) => SessionKind::parse(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid session kind `{text}` in sessions.kind"))
        }),
        None => Ok(None),
    }
}
