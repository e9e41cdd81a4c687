//! Per-player attendance statistics.
//!
//! Stateless: every call recomputes from the current store contents, so the
//! result always reflects the latest recorded attendance.

use crate::model::attendance::AttendanceStatistics;
use crate::model::player::PlayerId;
use crate::repo::attendance_repo::AttendanceStore;
use crate::repo::RepoResult;

/// Computes `AttendanceStatistics` from an attendance store.
pub struct AttendanceAggregator<'store, S: AttendanceStore> {
    store: &'store S,
}

impl<'store, S: AttendanceStore> AttendanceAggregator<'store, S> {
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    /// Statistics over every record of `player_id`; all zeros when none exist.
    pub fn compute_for(&self, player_id: PlayerId) -> RepoResult<AttendanceStatistics> {
        let tally = self.store.tally_for_player(player_id)?;
        Ok(AttendanceStatistics::from_tally(player_id, tally))
    }
}
