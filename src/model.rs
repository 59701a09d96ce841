use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Occupant gender. `Other` shows up on candidate records from the sheet;
/// the twin-room lock is a plain equality check so it needs no special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomType {
    #[default]
    Single,
    Twin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedStatus {
    Available,
    Occupied,
}

/// Addresses one physical bed slot: room plus position within the room
/// (0 or 1 for twin rooms).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BedKey {
    pub room_no: String,
    pub bed_index: u8,
}

impl BedKey {
    pub fn new(room_no: impl Into<String>, bed_index: u8) -> Self {
        Self {
            room_no: room_no.into(),
            bed_index,
        }
    }
}

impl std::fmt::Display for BedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.room_no, self.bed_index)
    }
}

/// One bed slot as reported by `/api/beds`. Occupant fields carry data only
/// when `status` is Occupied; the sheet-backed store sends empty strings for
/// vacant slots, which deserialize to `None`/empty here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub room_no: String,
    pub bed_index: u8,
    pub room_type: RoomType,
    pub status: BedStatus,
    #[serde(default, deserialize_with = "de_opt_gender")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub admission_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub discharge_date: Option<NaiveDate>,
    #[serde(default)]
    pub pain_point: String,
}

impl Bed {
    pub fn key(&self) -> BedKey {
        BedKey::new(self.room_no.clone(), self.bed_index)
    }

    pub fn is_occupied(&self) -> bool {
        self.status == BedStatus::Occupied
    }
}

/// Empty or unrecognized gender strings mean "not recorded", not an error.
fn de_opt_gender<'de, D>(d: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(|s| s.parse().ok()))
}

/// Dates arrive as `YYYY-MM-DD` strings; empty means unset, malformed is an error.
fn de_opt_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// POST body for `/api/beds/allocate`. The engine fills the room fields from
/// the target bed; callers only provide the occupant fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub patient_name: String,
    pub member_id: String,
    pub gender: Option<Gender>,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub pain_point: String,
    pub room_no: String,
    pub bed_index: u8,
    pub room_type: RoomType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WardStats {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
}

/// Per-room notification payload, broadcast after each committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedEvent {
    Allocated {
        key: BedKey,
        member_id: String,
        gender: Gender,
    },
    Discharged {
        key: BedKey,
    },
    DischargeDateUpdated {
        key: BedKey,
        discharge_date: NaiveDate,
    },
}

// ── Display helpers ──────────────────────────────────────────────

/// Ellipsis-truncate a patient name to `budget` characters. A zero budget
/// yields an empty string rather than a lone ellipsis.
pub fn truncate_name(name: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    if name.chars().count() <= budget {
        return name.to_string();
    }
    let mut out: String = name.chars().take(budget.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Compact badge: the last `len` characters of a member ID.
pub fn id_badge(member_id: &str, len: usize) -> &str {
    let total = member_id.chars().count();
    if total <= len {
        return member_id;
    }
    let skip = total - len;
    match member_id.char_indices().nth(skip) {
        Some((idx, _)) => &member_id[idx..],
        None => member_id,
    }
}
