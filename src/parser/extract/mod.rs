pub mod bills;
pub mod legislators;
pub mod rolls;

use chrono::Datelike;

/// Structured references recovered from one update's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub bill_ids: Vec<String>,
    pub roll_ids: Vec<String>,
    pub bioguide_ids: Vec<String>,
}

pub fn extract_all(text: &str, session: &str) -> Identifiers {
    Identifiers {
        bill_ids: bills::extract(text, session),
        roll_ids: rolls::extract(text, session),
        bioguide_ids: legislators::extract(text),
    }
}

/// Congress number for a calendar year: the 1st met in 1789-90, each lasts two years.
pub fn session_for_year(year: i32) -> String {
    ((year + 1) / 2 - 894).to_string()
}

pub fn current_session() -> String {
    session_for_year(chrono::Local::now().year())
}

// ── Tests ──
