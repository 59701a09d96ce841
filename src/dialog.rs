//! Allocation-dialog lifecycle.
//!
//! The dialog closes the moment the operator submits, before the network
//! call resolves, and reopens with the draft intact if the backend rejects
//! the allocation. Modeled as an explicit state machine instead of callback
//! ordering; each in-flight submission is tagged so a stale settlement
//! cannot disturb a newer attempt.

use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::{AllocationRequest, BedKey, Gender};

/// Operator-edited fields. `gender_locked` marks the selector disabled
/// because the twin sibling is occupied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub patient_name: String,
    pub member_id: String,
    pub gender: Option<Gender>,
    pub gender_locked: bool,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub pain_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open { draft: Draft },
    Pending { op: Ulid, draft: Draft },
    Failed { detail: String, draft: Draft },
}

pub struct AllocationDialog {
    key: BedKey,
    state: DialogState,
}

impl AllocationDialog {
    /// Open for a target bed. `locked` is the gender forced by an occupied
    /// twin sibling, evaluated from current bed state at open time.
    pub fn open(key: BedKey, locked: Option<Gender>) -> Self {
        let draft = Draft {
            gender: locked,
            gender_locked: locked.is_some(),
            ..Draft::default()
        };
        Self {
            key,
            state: DialogState::Open { draft },
        }
    }

    pub fn key(&self) -> &BedKey {
        &self.key
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == DialogState::Closed
    }

    /// Failure detail shown to the operator, when in the Failed state.
    pub fn failure_detail(&self) -> Option<&str> {
        match &self.state {
            DialogState::Failed { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Mutable access to the draft while the operator can still edit it.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            DialogState::Open { draft } | DialogState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Change the gender selection. Returns false when the selector is
    /// locked or the dialog is not editable.
    pub fn set_gender(&mut self, gender: Gender) -> bool {
        match self.draft_mut() {
            Some(draft) if !draft.gender_locked => {
                draft.gender = Some(gender);
                true
            }
            _ => false,
        }
    }

    /// Optimistic submit: the dialog leaves the editable state immediately
    /// and the caller dispatches the returned request. `None` when there is
    /// nothing to submit.
    pub fn submit(&mut self) -> Option<(Ulid, AllocationRequest)> {
        let draft = match &self.state {
            DialogState::Open { draft } | DialogState::Failed { draft, .. } => draft.clone(),
            _ => return None,
        };
        let op = Ulid::new();
        let req = AllocationRequest {
            patient_name: draft.patient_name.clone(),
            member_id: draft.member_id.clone(),
            gender: draft.gender,
            admission_date: draft.admission_date,
            discharge_date: draft.discharge_date,
            pain_point: draft.pain_point.clone(),
            room_no: self.key.room_no.clone(),
            bed_index: self.key.bed_index,
            ..AllocationRequest::default()
        };
        self.state = DialogState::Pending { op, draft };
        Some((op, req))
    }

    /// Settle a successful submission. Stale op ids are ignored.
    pub fn settle_ok(&mut self, op: Ulid) -> bool {
        match &self.state {
            DialogState::Pending { op: current, .. } if *current == op => {
                self.state = DialogState::Closed;
                true
            }
            _ => false,
        }
    }

    /// Settle a failed submission: reopen with the draft retained so the
    /// operator can correct and retry. Stale op ids are ignored.
    pub fn settle_err(&mut self, op: Ulid, detail: impl Into<String>) -> bool {
        match &self.state {
            DialogState::Pending { op: current, draft } if *current == op => {
                self.state = DialogState::Failed {
                    detail: detail.into(),
                    draft: draft.clone(),
                };
                true
            }
            _ => false,
        }
    }

    /// Operator abandons the dialog. A pending submission stays pending —
    /// dispatched requests are not cancellable.
    pub fn cancel(&mut self) -> bool {
        match &self.state {
            DialogState::Open { .. } | DialogState::Failed { .. } => {
                self.state = DialogState::Closed;
                true
            }
            _ => false,
        }
    }
}
