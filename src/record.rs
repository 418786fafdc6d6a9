use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::extract;

pub const CHAMBER: &str = "senate";

/// One discovered floor update, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub chamber: String,
    pub legislative_day: String,
    /// When this run first saw the update, not when it happened on the floor.
    pub timestamp: DateTime<Utc>,
    pub events: Vec<String>,
    pub bill_ids: Vec<String>,
    pub roll_ids: Vec<String>,
    pub bioguide_ids: Vec<String>,
}

/// Assemble the record for a newly seen update. Whether it is new is the
/// caller's business.
pub fn build_record(
    legislative_day: &str,
    text: &str,
    timestamp: DateTime<Utc>,
    session: &str,
) -> UpdateRecord {
    let ids = extract::extract_all(text, session);
    UpdateRecord {
        chamber: CHAMBER.to_string(),
        legislative_day: legislative_day.to_string(),
        timestamp,
        events: vec![text.to_string()],
        bill_ids: ids.bill_ids,
        roll_ids: ids.roll_ids,
        bioguide_ids: ids.bioguide_ids,
    }
}
