use std::time::Instant;

use chrono::NaiveDate;

use crate::model::{AllocationRequest, BedEvent, BedKey};

use super::{Engine, EngineError, rules};

impl Engine {
    /// Allocate a bed. Local preconditions run against the current cache;
    /// passing them only clears the dispatch — the backend stays the final
    /// authority and its `detail` surfaces verbatim on rejection.
    pub async fn allocate(
        &self,
        key: &BedKey,
        mut req: AllocationRequest,
    ) -> Result<(), EngineError> {
        let start = Instant::now();
        let gender = {
            let beds = self.beds_guard().await;
            if let Err(e) = rules::validate_allocation(&beds, key, &req) {
                return Err(Self::note_failure("allocate", e));
            }
            let bed = beds
                .iter()
                .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
                .ok_or_else(|| EngineError::UnknownBed(key.clone()))?;
            req.room_no = bed.room_no.clone();
            req.bed_index = bed.bed_index;
            req.room_type = bed.room_type;
            // Validation guarantees a gender is present.
            req.gender.ok_or(EngineError::MissingField("gender"))?
        };

        match self.backend.allocate(&req).await {
            Ok(()) => {
                let event = BedEvent::Allocated {
                    key: key.clone(),
                    member_id: req.member_id.clone(),
                    gender,
                };
                self.finish_op("allocate", start, &key.room_no, event).await
            }
            Err(e) => Err(Self::note_failure("allocate", e.into())),
        }
    }

    /// Discharge an occupant. Refused client-side while the recorded
    /// discharge date lies in the future.
    pub async fn discharge(&self, key: &BedKey) -> Result<(), EngineError> {
        let start = Instant::now();
        {
            let beds = self.beds_guard().await;
            let bed = beds
                .iter()
                .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
                .ok_or_else(|| Self::note_failure("discharge", EngineError::UnknownBed(key.clone())))?;
            if !bed.is_occupied() {
                return Err(Self::note_failure(
                    "discharge",
                    EngineError::BedVacant(key.clone()),
                ));
            }
            if let Err(e) = rules::check_discharge_floor(bed, rules::today()) {
                return Err(Self::note_failure("discharge", e));
            }
        }

        match self.backend.discharge(key).await {
            Ok(()) => {
                let event = BedEvent::Discharged { key: key.clone() };
                self.finish_op("discharge", start, &key.room_no, event).await
            }
            Err(e) => Err(Self::note_failure("discharge", e.into())),
        }
    }

    /// Move an occupant's recorded discharge date. Free-form update; the
    /// bed stays Occupied throughout.
    pub async fn update_discharge_date(
        &self,
        key: &BedKey,
        discharge_date: NaiveDate,
    ) -> Result<(), EngineError> {
        let start = Instant::now();
        {
            let beds = self.beds_guard().await;
            let bed = beds
                .iter()
                .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
                .ok_or_else(|| {
                    Self::note_failure("update_discharge", EngineError::UnknownBed(key.clone()))
                })?;
            if !bed.is_occupied() {
                return Err(Self::note_failure(
                    "update_discharge",
                    EngineError::BedVacant(key.clone()),
                ));
            }
        }

        match self.backend.update_discharge(key, discharge_date).await {
            Ok(()) => {
                let event = BedEvent::DischargeDateUpdated {
                    key: key.clone(),
                    discharge_date,
                };
                self.finish_op("update_discharge", start, &key.room_no, event)
                    .await
            }
            Err(e) => Err(Self::note_failure("update_discharge", e.into())),
        }
    }

    /// Fire-and-forget complaint logging. Failures are debug-logged and
    /// never surfaced to the operator.
    pub fn log_complaint(&self, message: String) {
        let backend = self.backend_handle();
        tokio::spawn(async move {
            if let Err(e) = backend.log_complaint(&message).await {
                tracing::debug!("complaint log dropped: {e}");
            }
        });
    }

    /// Fire-and-forget feedback logging.
    pub fn log_feedback(&self, message: String) {
        let backend = self.backend_handle();
        tokio::spawn(async move {
            if let Err(e) = backend.log_feedback(&message).await {
                tracing::debug!("feedback log dropped: {e}");
            }
        });
    }
}
