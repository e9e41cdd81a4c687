//! Attendance relation between players and training sessions.
//!
//! # Responsibility
//! - Define the persisted attendance fact and its enriched read models.
//! - Derive per-player statistics from raw counts.
//!
//! # Invariants
//! - `(player_id, session_id)` identifies at most one record.
//! - `id` is assigned on first insert and never changes on later upserts.
//! - `present_percentage` is computed with integer half-up rounding to two
//!   decimals and is `0` when no sessions are tracked.

use super::player::PlayerId;
use super::session::{SessionId, SessionKind};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Storage-assigned attendance identifier.
pub type AttendanceId = i64;

/// One attendance fact for a `(player, session)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub player_id: PlayerId,
    pub session_id: SessionId,
    pub present: bool,
}

/// Attendance row for a session listing, joined with player identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub player_name: String,
    pub player_surname: Option<String>,
    pub position: Option<String>,
    pub squad_number: Option<u8>,
}

/// Attendance row for a player listing, joined with session identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub session_name: String,
    pub starts_at: NaiveDateTime,
    pub location: Option<String>,
    pub kind: Option<SessionKind>,
}

/// Raw counts for one player, as read from storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    pub total: u64,
    pub present: u64,
}

/// Derived attendance statistics for one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatistics {
    pub player_id: PlayerId,
    pub total_sessions: u64,
    pub present_count: u64,
    pub absent_count: u64,
    pub present_percentage: f64,
}

impl AttendanceStatistics {
    /// All-zero statistics for a player with no tracked sessions.
    pub fn empty(player_id: PlayerId) -> Self {
        Self::from_tally(player_id, AttendanceTally::default())
    }

    pub fn from_tally(player_id: PlayerId, tally: AttendanceTally) -> Self {
        let present = tally.present.min(tally.total);
        Self {
            player_id,
            total_sessions: tally.total,
            present_count: present,
            absent_count: tally.total - present,
            present_percentage: present_percentage(present, tally.total),
        }
    }
}

/// Percentage of `present` over `total`, half-up rounded to 2 decimals.
///
/// Rounding happens on integer hundredths, so equal inputs give bit-identical
/// outputs regardless of float behavior.
pub fn present_percentage(present: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let hundredths = (u128::from(present) * 20_000 + u128::from(total)) / (2 * u128::from(total));
    hundredths as f64 / 100.0
}
