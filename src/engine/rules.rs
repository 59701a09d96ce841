use chrono::NaiveDate;

use crate::limits::*;
use crate::model::{AllocationRequest, Bed, BedKey};

use super::EngineError;
use super::occupancy::locked_gender;

/// Current calendar day. Rule checks take the day as a parameter so tests
/// stay deterministic; this is the production source.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// All local preconditions for allocating `key`, evaluated against the
/// current bed cache. Passing here only means the dispatch may proceed —
/// final authority rests with the backend.
pub fn validate_allocation(
    beds: &[Bed],
    key: &BedKey,
    req: &AllocationRequest,
) -> Result<(), EngineError> {
    let bed = beds
        .iter()
        .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
        .ok_or_else(|| EngineError::UnknownBed(key.clone()))?;
    if bed.is_occupied() {
        return Err(EngineError::BedOccupied(key.clone()));
    }

    if req.patient_name.trim().is_empty() && req.member_id.trim().is_empty() {
        return Err(EngineError::MissingField("patient_name or member_id"));
    }
    if req.patient_name.len() > MAX_PATIENT_NAME_LEN {
        return Err(EngineError::LimitExceeded("patient name too long"));
    }
    if req.pain_point.len() > MAX_PAIN_POINT_LEN {
        return Err(EngineError::LimitExceeded("pain point too long"));
    }
    if key.room_no.len() > MAX_ROOM_NO_LEN {
        return Err(EngineError::LimitExceeded("room number too long"));
    }

    let gender = req.gender.ok_or(EngineError::MissingField("gender"))?;
    if let Some(required) = locked_gender(beds, key)
        && gender != required {
            return Err(EngineError::GenderLocked {
                key: key.clone(),
                required,
            });
        }

    if req.admission_date.is_none() {
        return Err(EngineError::MissingField("admission_date"));
    }

    // At most one active occupancy per member.
    let member_id = req.member_id.trim();
    if !member_id.is_empty()
        && beds.iter().any(|b| b.is_occupied() && b.member_id == member_id) {
            return Err(EngineError::AlreadyAdmitted(member_id.to_string()));
        }

    Ok(())
}

/// Discharge floor: an occupant whose recorded discharge date lies strictly
/// after today cannot be discharged until the date is updated. Dates are
/// calendar days, so no time-of-day normalization is needed here.
pub fn check_discharge_floor(bed: &Bed, today: NaiveDate) -> Result<(), EngineError> {
    if let Some(discharge_date) = bed.discharge_date
        && discharge_date > today {
            return Err(EngineError::DischargeAfterToday { discharge_date });
        }
    Ok(())
}

/// Whole days since admission. A future admission date yields the absolute
/// distance rather than clamping to zero.
pub fn days_occupied(admission: NaiveDate, today: NaiveDate) -> i64 {
    (today - admission).num_days().abs()
}
