//! Attendance store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every read and write of the `attendance` table.
//! - Provide enriched listings joined with roster display fields.
//!
//! # Invariants
//! - `upsert` is the only mutation path and runs as one statement against the
//!   `UNIQUE(player_id, session_id)` constraint, so a pair never gets two rows.
//! - `remove` of a missing pair reports `0` changes instead of failing.
//! - Listings use inner joins; rows whose player/session was deleted are
//!   omitted from listings but still counted by `tally_for_player`.

use crate::model::attendance::{
    AttendanceRecord, AttendanceTally, PlayerAttendanceEntry, SessionAttendanceEntry,
};
use crate::model::player::PlayerId;
use crate::model::session::SessionId;
use crate::repo::player_repo::parse_squad_number;
use crate::repo::session_repo::{parse_datetime, parse_kind};
use crate::repo::{bool_to_int, count_to_u64, int_to_bool, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Storage contract for the attendance relation.
pub trait AttendanceStore {
    /// Point lookup by attendance pair.
    fn find(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
    ) -> RepoResult<Option<AttendanceRecord>>;
    /// Records for one session, ordered by player name then surname.
    fn list_by_session(&self, session_id: SessionId) -> RepoResult<Vec<SessionAttendanceEntry>>;
    /// Records for one player, most recent session first.
    fn list_by_player(&self, player_id: PlayerId) -> RepoResult<Vec<PlayerAttendanceEntry>>;
    /// Inserts the pair or updates `present` in place, keeping the id.
    fn upsert(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
        present: bool,
    ) -> RepoResult<AttendanceRecord>;
    /// Deletes the pair and returns the number of removed rows (0 or 1).
    fn remove(&self, player_id: PlayerId, session_id: SessionId) -> RepoResult<usize>;
    /// Total and present counts over every record of one player.
    fn tally_for_player(&self, player_id: PlayerId) -> RepoResult<AttendanceTally>;
}

/// SQLite-backed attendance store.
pub struct SqliteAttendanceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttendanceStore for SqliteAttendanceStore<'_> {
    fn find(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
    ) -> RepoResult<Option<AttendanceRecord>> {
        self.conn
            .query_row(
                "SELECT id, player_id, session_id, present
                 FROM attendance
                 WHERE player_id = ?1 AND session_id = ?2;",
                params![player_id, session_id],
                RawRecord::from_row,
            )
            .optional()?
            .map(RawRecord::decode)
            .transpose()
    }

    fn list_by_session(&self, session_id: SessionId) -> RepoResult<Vec<SessionAttendanceEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id,
                a.player_id,
                a.session_id,
                a.present,
                p.name,
                p.surname,
                p.position,
                p.squad_number
             FROM attendance a
             INNER JOIN players p ON p.id = a.player_id
             WHERE a.session_id = ?1
             ORDER BY p.name ASC, p.surname ASC, a.id ASC;",
        )?;

        let mut rows = stmt.query([session_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let record = RawRecord::from_row(row)?.decode()?;
            entries.push(SessionAttendanceEntry {
                record,
                player_name: row.get("name")?,
                player_surname: row.get("surname")?,
                position: row.get("position")?,
                squad_number: parse_squad_number(row.get("squad_number")?)?,
            });
        }

        Ok(entries)
    }

    fn list_by_player(&self, player_id: PlayerId) -> RepoResult<Vec<PlayerAttendanceEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id,
                a.player_id,
                a.session_id,
                a.present,
                s.name,
                s.starts_at,
                s.location,
                s.kind
             FROM attendance a
             INNER JOIN sessions s ON s.id = a.session_id
             WHERE a.player_id = ?1
             ORDER BY s.starts_at DESC, a.id ASC;",
        )?;

        let mut rows = stmt.query([player_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let record = RawRecord::from_row(row)?.decode()?;
            let starts_at: String = row.get("starts_at")?;
            entries.push(PlayerAttendanceEntry {
                record,
                session_name: row.get("name")?,
                starts_at: parse_datetime(&starts_at, "sessions.starts_at")?,
                location: row.get("location")?,
                kind: parse_kind(row.get("kind")?)?,
            });
        }

        Ok(entries)
    }

    fn upsert(
        &self,
        player_id: PlayerId,
        session_id: SessionId,
        present: bool,
    ) -> RepoResult<AttendanceRecord> {
        let raw = self.conn.query_row(
            "INSERT INTO attendance (player_id, session_id, present)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (player_id, session_id)
             DO UPDATE SET present = excluded.present
             RETURNING id, player_id, session_id, present;",
            params![player_id, session_id, bool_to_int(present)],
            RawRecord::from_row,
        )?;
        let record = raw.decode()?;

        debug!(
            "event=attendance_upsert module=repo status=ok attendance_id={} player_id={} session_id={} present={}",
            record.id, player_id, session_id, present
        );
        Ok(record)
    }

    fn remove(&self, player_id: PlayerId, session_id: SessionId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM attendance WHERE player_id = ?1 AND session_id = ?2;",
            params![player_id, session_id],
        )?;

        debug!(
            "event=attendance_remove module=repo status=ok player_id={} session_id={} changed={}",
            player_id, session_id, changed
        );
        Ok(changed)
    }

    fn tally_for_player(&self, player_id: PlayerId) -> RepoResult<AttendanceTally> {
        let (total, present): (i64, i64) = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN present = 1 THEN 1 ELSE 0 END), 0)
             FROM attendance
             WHERE player_id = ?1;",
            [player_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(AttendanceTally {
            total: count_to_u64(total, "attendance tally total")?,
            present: count_to_u64(present, "attendance tally present")?,
        })
    }
}

/// Attendance row before the 0/1 `present` column is decoded.
struct RawRecord {
    id: i64,
    player_id: PlayerId,
    session_id: SessionId,
    present: i64,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            player_id: row.get(1)?,
            session_id: row.get(2)?,
            present: row.get(3)?,
        })
    }

    fn decode(self) -> RepoResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: self.id,
            player_id: self.player_id,
            session_id: self.session_id,
            present: int_to_bool(self.present, "attendance.present")?,
        })
    }
}
