use std::collections::{HashMap, HashSet};

use crate::limits::MAX_CANDIDATE_ROWS;
use crate::lookup::{self, Candidate};
use crate::model::{Bed, BedKey, Gender, WardStats};
use crate::observability;

use super::{Engine, EngineError, occupancy};

impl Engine {
    /// Beds grouped by room, from the current cache.
    pub async fn rooms(&self) -> HashMap<String, Vec<Bed>> {
        occupancy::group_by_room(&self.beds_guard().await)
    }

    pub async fn stats(&self) -> WardStats {
        occupancy::compute_stats(&self.beds_guard().await)
    }

    pub async fn bed(&self, key: &BedKey) -> Option<Bed> {
        self.beds_guard()
            .await
            .iter()
            .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
            .cloned()
    }

    /// Gender forced on a new allocation in this bed's room, if any.
    /// Re-evaluated from the current cache on every call.
    pub async fn locked_gender_for(&self, key: &BedKey) -> Option<Gender> {
        occupancy::locked_gender(&self.beds_guard().await, key)
    }

    /// Member IDs currently occupying a bed.
    pub async fn occupied_member_ids(&self) -> HashSet<String> {
        self.beds_guard()
            .await
            .iter()
            .filter(|b| b.is_occupied() && !b.member_id.is_empty())
            .map(|b| b.member_id.clone())
            .collect()
    }

    /// Fetch the candidate sheet and extract selectable patients, excluding
    /// members who already occupy a bed.
    pub async fn candidates(&self, limit: usize) -> Result<Vec<Candidate>, EngineError> {
        let sheet = self
            .backend_handle()
            .fetch_candidates(limit.min(MAX_CANDIDATE_ROWS))
            .await?;
        let occupied = self.occupied_member_ids().await;
        let options = lookup::candidate_options(&sheet, &occupied);
        let filtered = sheet.rows.len().saturating_sub(options.len());
        if filtered > 0 {
            metrics::counter!(observability::CANDIDATES_FILTERED_TOTAL)
                .increment(filtered as u64);
        }
        Ok(options)
    }
}
