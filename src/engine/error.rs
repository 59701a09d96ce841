use chrono::NaiveDate;

use crate::backend::BackendError;
use crate::model::{BedKey, Gender};

#[derive(Debug)]
pub enum EngineError {
    UnknownBed(BedKey),
    BedOccupied(BedKey),
    BedVacant(BedKey),
    MissingField(&'static str),
    GenderLocked { key: BedKey, required: Gender },
    AlreadyAdmitted(String),
    DischargeAfterToday { discharge_date: NaiveDate },
    LimitExceeded(&'static str),
    Rejected(String),
    Transport(String),
}

impl EngineError {
    /// True for local checks that blocked the dispatch entirely, as opposed
    /// to transport or backend failures.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, EngineError::Rejected(_) | EngineError::Transport(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownBed(key) => write!(f, "no such bed: {key}"),
            EngineError::BedOccupied(key) => write!(f, "bed {key} is already occupied"),
            EngineError::BedVacant(key) => write!(f, "bed {key} is not occupied"),
            EngineError::MissingField(field) => write!(f, "missing required field: {field}"),
            EngineError::GenderLocked { key, required } => write!(
                f,
                "room of bed {key} is occupied by a {required} patient; gender must match"
            ),
            EngineError::AlreadyAdmitted(member_id) => {
                write!(f, "member {member_id} already occupies a bed")
            }
            EngineError::DischargeAfterToday { discharge_date } => write!(
                f,
                "recorded discharge date {discharge_date} is in the future; update the discharge date before discharging"
            ),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Rejected(detail) => write!(f, "backend rejected request: {detail}"),
            EngineError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<BackendError> for EngineError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Rejected(detail) => EngineError::Rejected(detail),
            BackendError::Transport(msg) => EngineError::Transport(msg),
        }
    }
}
