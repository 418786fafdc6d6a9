use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use super::blocks::{Block, Role};
use super::text::clean_text;

static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .unwrap()
});
static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b")
        .unwrap()
});
static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Page decorations inside the log's scope, compared lower-cased after cleaning.
/// A paragraph holding only a non-breaking space cleans down to "".
const IGNORED: &[&str] = &["senate floor proceedings", "today's senate floor log", ""];

/// Legislative day (`YYYY-MM-DD`) → cleaned update texts in document order.
pub type DayGroups = BTreeMap<String, Vec<String>>;

/// Malformed input met during segmentation. None of these stop the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("got to an update without a date, skipping: {0:?}")]
    UpdateBeforeDate(String),
    #[error("paragraph without alignment, may be worth checking: {0:?}")]
    Unaligned(String),
    #[error("date header {0:?} could not be parsed, skipping its updates")]
    BadDateHeader(String),
}

#[derive(Debug, Default)]
pub struct Segmented {
    pub days: DayGroups,
    pub anomalies: Vec<Anomaly>,
}

impl Segmented {
    pub fn update_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Accumulator threaded through the pass: the output so far plus the active day.
#[derive(Default)]
struct Pass {
    current_day: Option<String>,
    out: Segmented,
}

impl Pass {
    fn step(mut self, block: &Block) -> Self {
        let text = clean_text(&block.text);
        if IGNORED.contains(&text.to_lowercase().as_str()) {
            return self;
        }

        match block.role {
            Role::Centered => match parse_day(&text) {
                Some(day) => {
                    let key = day.format("%Y-%m-%d").to_string();
                    self.out.days.entry(key.clone()).or_default();
                    self.current_day = Some(key);
                }
                None => {
                    self.current_day = None;
                    self.out.anomalies.push(Anomaly::BadDateHeader(text));
                }
            },
            Role::Left => match &self.current_day {
                Some(day) => self.out.days.entry(day.clone()).or_default().push(text),
                None => self.out.anomalies.push(Anomaly::UpdateBeforeDate(text)),
            },
            Role::Other => self.out.anomalies.push(Anomaly::Unaligned(text)),
        }
        self
    }
}

/// Group update bodies under the most recent date header.
///
/// A day that reappears later in the document keeps appending to its group.
pub fn group_by_day(blocks: &[Block]) -> Segmented {
    blocks.iter().fold(Pass::default(), Pass::step).out
}

/// Find the calendar date in a header such as "Monday, March 4, 2024".
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_DATE_RE.captures(text) {
        let month = month_number(&caps[1])?;
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?);
    }
    if let Some(caps) = DAY_FIRST_RE.captures(text) {
        let month = month_number(&caps[2])?;
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?);
    }
    if let Some(caps) = SLASH_DATE_RE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        );
    }
    let caps = ISO_DATE_RE.captures(text)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

fn month_number(prefix: &str) -> Option<u32> {
    let prefix = prefix.to_lowercase();
    MONTHS.iter().position(|m| *m == prefix).map(|i| i as u32 + 1)
}

// ── Tests ──
