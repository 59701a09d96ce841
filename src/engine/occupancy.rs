use std::collections::HashMap;

use crate::model::{Bed, BedKey, Gender, WardStats};

// ── Occupancy index ──────────────────────────────────────────────

/// Group a flat bed list by room. Beds within a room keep stable input
/// order; no ordering is guaranteed across rooms.
pub fn group_by_room(beds: &[Bed]) -> HashMap<String, Vec<Bed>> {
    let mut rooms: HashMap<String, Vec<Bed>> = HashMap::new();
    for bed in beds {
        rooms.entry(bed.room_no.clone()).or_default().push(bed.clone());
    }
    rooms
}

pub fn compute_stats(beds: &[Bed]) -> WardStats {
    let total = beds.len();
    let occupied = beds.iter().filter(|b| b.is_occupied()).count();
    WardStats {
        total,
        occupied,
        available: total - occupied,
    }
}

/// The other bed in the same room (different `bed_index`). `None` for
/// Single rooms and malformed twin groups with one bed.
pub fn sibling_of<'a>(beds: &'a [Bed], key: &BedKey) -> Option<&'a Bed> {
    beds.iter()
        .find(|b| b.room_no == key.room_no && b.bed_index != key.bed_index)
}

// ── Gender-lock rule ─────────────────────────────────────────────

/// If the sibling bed is occupied, its gender is forced on any new
/// allocation in this room. Must be re-evaluated from current bed state on
/// every consultation — never cached across refreshes.
pub fn locked_gender(beds: &[Bed], key: &BedKey) -> Option<Gender> {
    let sibling = sibling_of(beds, key)?;
    if sibling.is_occupied() {
        sibling.gender
    } else {
        None
    }
}
