//! Heuristic patient-record extraction from schema-less sheet rows.
//!
//! The upstream sheet has no stable column order, so fields are located by
//! typed matchers applied in a fixed priority order: member ID first, then
//! name, gender, and pain point. Extraction is best-effort by contract — a
//! field with no match comes back empty, never as an error — and ambiguous
//! rows may misassign fields.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Gender;

/// `GET /search_data` payload: header names plus loosely-typed rows, each an
/// array or an object of strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSheet {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// Best-effort extraction result. Empty string means "not found".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidate {
    pub member_id: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub pain_point: String,
}

/// External patient identifier, `MID-YYYY-MM-DD-<digits>`.
fn member_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^MID-\d{4}-\d{2}-\d{2}-\d+$").expect("member id pattern"))
}

const STATUS_KEYWORDS: [&str; 5] = ["active", "inactive", "good", "bad", "interested"];

const PAIN_POINT_KEYWORDS: [&str; 8] = [
    "care",
    "therapy",
    "nursing",
    "living",
    "checkup",
    "consultation",
    "emergency",
    "diagnosis",
];

/// Flatten one raw row to an ordered token list. Arrays keep element order;
/// objects are read in `headers` order (keys the headers don't cover are
/// appended after, in the object's own order). Non-string cells are skipped.
pub fn row_tokens(row: &Value, headers: &[String]) -> Vec<String> {
    let mut tokens = Vec::new();
    match row {
        Value::Array(cells) => {
            for cell in cells {
                push_token(&mut tokens, cell);
            }
        }
        Value::Object(map) => {
            let mut taken: HashSet<&str> = HashSet::new();
            for header in headers {
                if let Some(cell) = map.get(header) {
                    push_token(&mut tokens, cell);
                    taken.insert(header.as_str());
                }
            }
            for (key, cell) in map {
                if !taken.contains(key.as_str()) {
                    push_token(&mut tokens, cell);
                }
            }
        }
        _ => {}
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, cell: &Value) {
    match cell {
        Value::String(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                tokens.push(trimmed.to_string());
            }
        }
        Value::Number(n) => tokens.push(n.to_string()),
        _ => {}
    }
}

fn looks_like_name(token: &str) -> bool {
    let trimmed = token.trim();
    if trimmed.chars().count() < 3 {
        return false;
    }
    if trimmed.contains('@') || trimmed.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !STATUS_KEYWORDS.contains(&lower.as_str())
}

fn matches_pain_point(token: &str) -> bool {
    let lower = token.to_lowercase();
    PAIN_POINT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Apply the typed matchers to an ordered token list.
pub fn extract_candidate(tokens: &[String]) -> Candidate {
    let member_id = tokens
        .iter()
        .find(|t| member_id_re().is_match(t))
        .cloned()
        .unwrap_or_default();

    let name_pos = tokens
        .iter()
        .position(|t| *t != member_id && looks_like_name(t));
    let name = name_pos.map(|i| tokens[i].clone()).unwrap_or_default();

    let gender = tokens.iter().find_map(|t| t.parse::<Gender>().ok());

    // Scan after the name; when no name was found, scan everything. No
    // fallback beyond the keyword list — an unmatched row keeps a blank
    // pain point rather than guessing from arbitrary text.
    let scan_from = name_pos.map(|i| i + 1).unwrap_or(0);
    let pain_point = tokens[scan_from..]
        .iter()
        .find(|t| matches_pain_point(t))
        .cloned()
        .unwrap_or_default();

    Candidate {
        member_id,
        name,
        gender,
        pain_point,
    }
}

/// Extract every row of the sheet, keeping only candidates that carry a
/// member ID not already occupying a bed. At most one active occupancy per
/// member: occupied IDs never reach the selectable list.
pub fn candidate_options(
    sheet: &CandidateSheet,
    occupied_member_ids: &HashSet<String>,
) -> Vec<Candidate> {
    sheet
        .rows
        .iter()
        .map(|row| extract_candidate(&row_tokens(row, &sheet.headers)))
        .filter(|c| !c.member_id.is_empty() && !occupied_member_ids.contains(&c.member_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn toks(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_full_row() {
        let c = extract_candidate(&toks(&[
            "MID-2024-05-01-1023",
            "Ramesh Kumar",
            "Male",
            "Nursing care needed",
        ]));
        assert_eq!(c.member_id, "MID-2024-05-01-1023");
        assert_eq!(c.name, "Ramesh Kumar");
        assert_eq!(c.gender, Some(Gender::Male));
        assert_eq!(c.pain_point, "Nursing care needed");
    }

    #[test]
    fn extraction_survives_shuffled_columns() {
        let c = extract_candidate(&toks(&[
            "active",
            "MID-2023-11-02-7",
            "Lakshmi Devi",
            "female",
            "Palliative therapy",
        ]));
        assert_eq!(c.member_id, "MID-2023-11-02-7");
        assert_eq!(c.name, "Lakshmi Devi");
        assert_eq!(c.gender, Some(Gender::Female));
        assert_eq!(c.pain_point, "Palliative therapy");
    }

    #[test]
    fn name_skips_status_keywords_and_contacts() {
        let c = extract_candidate(&toks(&[
            "MID-2024-01-01-5",
            "interested",
            "someone@example.com",
            "Mo",
            "Anita Desai",
        ]));
        assert_eq!(c.name, "Anita Desai");
    }

    #[test]
    fn missing_fields_stay_empty() {
        let c = extract_candidate(&toks(&["9823012345", "active"]));
        assert_eq!(c, Candidate::default());
    }

    #[test]
    fn empty_row_never_errors() {
        let c = extract_candidate(&[]);
        assert!(c.member_id.is_empty());
        assert!(c.pain_point.is_empty());
    }

    #[test]
    fn pain_point_only_scanned_after_name() {
        // "24/7 care" sits before the name (and is not name-like); the
        // post-name scan must not pick it up, and nothing after matches.
        let c = extract_candidate(&toks(&[
            "MID-2024-02-02-9",
            "24/7 care",
            "Suresh",
            "male",
        ]));
        assert_eq!(c.name, "Suresh");
        assert!(c.pain_point.is_empty());
    }

    #[test]
    fn malformed_member_ids_rejected() {
        for bad in ["MID-24-05-01-1", "MID-2024-5-1-1", "XID-2024-05-01-1", "MID-2024-05-01-"] {
            let c = extract_candidate(&toks(&[bad]));
            assert!(c.member_id.is_empty(), "accepted {bad}");
        }
    }

    #[test]
    fn object_rows_follow_header_order() {
        let sheet = CandidateSheet {
            headers: vec!["id".into(), "name".into(), "gender".into()],
            rows: vec![json!({
                "gender": "Other",
                "name": "Kiran Bedi",
                "id": "MID-2024-03-03-44"
            })],
        };
        let tokens = row_tokens(&sheet.rows[0], &sheet.headers);
        assert_eq!(tokens[0], "MID-2024-03-03-44");
        assert_eq!(tokens[1], "Kiran Bedi");
        let c = extract_candidate(&tokens);
        assert_eq!(c.gender, Some(Gender::Other));
    }

    #[test]
    fn occupied_members_excluded_from_options() {
        let sheet = CandidateSheet {
            headers: vec![],
            rows: vec![
                json!(["MID-2024-05-01-1023", "Ramesh Kumar", "Male"]),
                json!(["MID-2024-05-01-1024", "Sita Verma", "Female"]),
                json!(["no id here", "Orphan Row"]),
            ],
        };
        let occupied: HashSet<String> = ["MID-2024-05-01-1023".to_string()].into();
        let options = candidate_options(&sheet, &occupied);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].member_id, "MID-2024-05-01-1024");
    }
}
