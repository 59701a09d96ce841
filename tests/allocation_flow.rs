//! End-to-end allocation flow through the public API: dialog state machine
//! driving the engine against an in-memory backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use bedboard::backend::{BackendError, BedBackend};
use bedboard::dialog::{AllocationDialog, DialogState};
use bedboard::engine::{Engine, EngineError};
use bedboard::lookup::CandidateSheet;
use bedboard::model::{AllocationRequest, Bed, BedKey, BedStatus, Gender, RoomType};
use bedboard::notify::NotifyHub;

struct InMemoryBackend {
    beds: Mutex<Vec<Bed>>,
    rejection: Mutex<Option<String>>,
}

impl InMemoryBackend {
    fn new(beds: Vec<Bed>) -> Arc<Self> {
        Arc::new(Self {
            beds: Mutex::new(beds),
            rejection: Mutex::new(None),
        })
    }

    fn reject_next(&self, detail: &str) {
        *self.rejection.lock().unwrap() = Some(detail.to_string());
    }
}

#[async_trait]
impl BedBackend for InMemoryBackend {
    async fn fetch_beds(&self) -> Result<Vec<Bed>, BackendError> {
        Ok(self.beds.lock().unwrap().clone())
    }

    async fn allocate(&self, req: &AllocationRequest) -> Result<(), BackendError> {
        if let Some(detail) = self.rejection.lock().unwrap().take() {
            return Err(BackendError::Rejected(detail));
        }
        let mut beds = self.beds.lock().unwrap();
        let bed = beds
            .iter_mut()
            .find(|b| b.room_no == req.room_no && b.bed_index == req.bed_index)
            .ok_or_else(|| BackendError::Rejected("no such bed".into()))?;
        if bed.is_occupied() {
            return Err(BackendError::Rejected("bed already occupied".into()));
        }
        bed.status = BedStatus::Occupied;
        bed.gender = req.gender;
        bed.patient_name = req.patient_name.clone();
        bed.member_id = req.member_id.clone();
        bed.admission_date = req.admission_date;
        bed.discharge_date = req.discharge_date;
        bed.pain_point = req.pain_point.clone();
        Ok(())
    }

    async fn discharge(&self, key: &BedKey) -> Result<(), BackendError> {
        let mut beds = self.beds.lock().unwrap();
        let bed = beds
            .iter_mut()
            .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
            .ok_or_else(|| BackendError::Rejected("no such bed".into()))?;
        bed.status = BedStatus::Available;
        bed.gender = None;
        bed.patient_name.clear();
        bed.member_id.clear();
        bed.admission_date = None;
        bed.discharge_date = None;
        bed.pain_point.clear();
        Ok(())
    }

    async fn update_discharge(
        &self,
        key: &BedKey,
        discharge_date: NaiveDate,
    ) -> Result<(), BackendError> {
        let mut beds = self.beds.lock().unwrap();
        let bed = beds
            .iter_mut()
            .find(|b| b.room_no == key.room_no && b.bed_index == key.bed_index)
            .ok_or_else(|| BackendError::Rejected("no such bed".into()))?;
        bed.discharge_date = Some(discharge_date);
        Ok(())
    }

    async fn fetch_candidates(&self, _limit: usize) -> Result<CandidateSheet, BackendError> {
        Ok(CandidateSheet::default())
    }

    async fn log_complaint(&self, _message: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn log_feedback(&self, _message: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

fn bed(room_no: &str, bed_index: u8, room_type: RoomType) -> Bed {
    Bed {
        room_no: room_no.into(),
        bed_index,
        room_type,
        status: BedStatus::Available,
        gender: None,
        patient_name: String::new(),
        member_id: String::new(),
        admission_date: None,
        discharge_date: None,
        pain_point: String::new(),
    }
}

async fn ward() -> (Arc<InMemoryBackend>, Engine) {
    let backend = InMemoryBackend::new(vec![
        bed("12", 0, RoomType::Twin),
        bed("12", 1, RoomType::Twin),
        bed("7", 0, RoomType::Single),
    ]);
    let engine = Engine::new(backend.clone(), Arc::new(NotifyHub::new()));
    engine.refresh().await.unwrap();
    (backend, engine)
}

fn fill_draft(dialog: &mut AllocationDialog, name: &str, member_id: &str) {
    let draft = dialog.draft_mut().unwrap();
    draft.patient_name = name.into();
    draft.member_id = member_id.into();
    draft.admission_date = NaiveDate::from_ymd_opt(2024, 5, 1);
}

#[tokio::test]
async fn dialog_driven_allocation_succeeds() {
    let (_, engine) = ward().await;
    let key = BedKey::new("7", 0);

    let locked = engine.locked_gender_for(&key).await;
    assert_eq!(locked, None);

    let mut dialog = AllocationDialog::open(key.clone(), locked);
    fill_draft(&mut dialog, "Ramesh Kumar", "MID-2024-05-01-1023");
    assert!(dialog.set_gender(Gender::Male));

    let (op, req) = dialog.submit().unwrap();
    // Dialog already left the editable state — the optimistic close.
    assert!(matches!(dialog.state(), DialogState::Pending { .. }));

    match engine.allocate(&key, req).await {
        Ok(()) => assert!(dialog.settle_ok(op)),
        Err(e) => panic!("allocation failed: {e}"),
    }
    assert!(dialog.is_closed());
    assert!(engine.bed(&key).await.unwrap().is_occupied());
}

#[tokio::test]
async fn rejected_allocation_reopens_dialog_for_retry() {
    let (backend, engine) = ward().await;
    let key = BedKey::new("7", 0);

    let mut dialog = AllocationDialog::open(key.clone(), None);
    fill_draft(&mut dialog, "Ramesh Kumar", "MID-2024-05-01-1023");
    dialog.set_gender(Gender::Male);

    backend.reject_next("row version conflict, reload and retry");
    let (op, req) = dialog.submit().unwrap();
    let err = engine.allocate(&key, req).await.unwrap_err();
    let EngineError::Rejected(detail) = err else {
        panic!("expected backend rejection, got {err}");
    };
    assert!(dialog.settle_err(op, detail.clone()));
    assert_eq!(dialog.failure_detail(), Some(detail.as_str()));

    // Draft survived; retry succeeds without retyping.
    let (retry_op, req) = dialog.submit().unwrap();
    engine.allocate(&key, req).await.unwrap();
    assert!(dialog.settle_ok(retry_op));
    assert!(engine.bed(&key).await.unwrap().is_occupied());
}

#[tokio::test]
async fn twin_room_lock_flows_into_dialog() {
    let (_, engine) = ward().await;

    let mut first = AllocationDialog::open(BedKey::new("12", 0), None);
    fill_draft(&mut first, "Asha Rao", "MID-2024-05-01-1");
    first.set_gender(Gender::Female);
    let (op, req) = first.submit().unwrap();
    engine.allocate(&BedKey::new("12", 0), req).await.unwrap();
    first.settle_ok(op);

    // Sibling dialog opens pre-locked to Female.
    let locked = engine.locked_gender_for(&BedKey::new("12", 1)).await;
    assert_eq!(locked, Some(Gender::Female));

    let mut second = AllocationDialog::open(BedKey::new("12", 1), locked);
    fill_draft(&mut second, "Sita Verma", "MID-2024-05-01-2");
    assert!(!second.set_gender(Gender::Male)); // selector disabled

    let (op, req) = second.submit().unwrap();
    assert_eq!(req.gender, Some(Gender::Female));
    engine.allocate(&BedKey::new("12", 1), req).await.unwrap();
    second.settle_ok(op);

    let rooms = engine.rooms().await;
    assert!(
        rooms["12"]
            .iter()
            .all(|b| b.gender == Some(Gender::Female))
    );
}

#[tokio::test]
async fn full_stay_lifecycle() {
    let (_, engine) = ward().await;
    let key = BedKey::new("7", 0);

    let mut dialog = AllocationDialog::open(key.clone(), None);
    fill_draft(&mut dialog, "Ramesh Kumar", "MID-2024-05-01-1023");
    dialog.set_gender(Gender::Male);
    let (op, req) = dialog.submit().unwrap();
    engine.allocate(&key, req).await.unwrap();
    dialog.settle_ok(op);

    let stats = engine.stats().await;
    assert_eq!(stats.occupied, 1);
    assert_eq!(stats.occupied + stats.available, stats.total);

    engine
        .update_discharge_date(&key, bedboard::engine::today())
        .await
        .unwrap();
    engine.discharge(&key).await.unwrap();

    let bed = engine.bed(&key).await.unwrap();
    assert_eq!(bed.status, BedStatus::Available);
    assert!(bed.member_id.is_empty());
    assert_eq!(engine.stats().await.occupied, 0);
}
