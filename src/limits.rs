//! Hard caps and display budgets. Everything user-supplied gets bounded
//! before it is sent to the backend or rendered.

/// Longest accepted patient name on an allocation request.
pub const MAX_PATIENT_NAME_LEN: usize = 128;

/// Longest accepted room identifier.
pub const MAX_ROOM_NO_LEN: usize = 16;

/// Longest accepted pain-point text on an allocation request.
pub const MAX_PAIN_POINT_LEN: usize = 256;

/// Backend `detail` strings are truncated to this before display.
pub const MAX_DETAIL_LEN: usize = 512;

/// Cap on candidate rows requested from the sheet backend.
pub const MAX_CANDIDATE_ROWS: usize = 500;

/// Character budget for patient names in compact listings.
pub const NAME_DISPLAY_BUDGET: usize = 18;

/// Member-ID badges show this many trailing characters.
pub const ID_BADGE_LEN: usize = 6;
