use rusqlite::Connection;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::db;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Failure,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Failure => "failure",
        }
    }
}

/// One operator-facing report. `attachment` carries data for manual recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub severity: Severity,
    pub source: String,
    pub message: String,
    pub attachment: Option<Value>,
}

impl ReportRow {
    pub fn new(severity: Severity, source: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: source.to_string(),
            message: message.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Value) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Diagnostic channel for a run. Reporting never fails the run.
pub trait Reporter {
    fn report(&mut self, row: ReportRow);

    fn success(&mut self, source: &str, message: impl Into<String>) {
        self.report(ReportRow::new(Severity::Success, source, message));
    }

    fn warning(&mut self, source: &str, message: impl Into<String>) {
        self.report(ReportRow::new(Severity::Warning, source, message));
    }

    fn failure(&mut self, source: &str, message: impl Into<String>, attachment: Value) {
        self.report(ReportRow::new(Severity::Failure, source, message).with_attachment(attachment));
    }
}

fn log(row: &ReportRow) {
    match row.severity {
        Severity::Success => info!("[{}] {}", row.source, row.message),
        Severity::Warning => warn!("[{}] {}", row.source, row.message),
        Severity::Failure => error!(
            "[{}] {} {}",
            row.source,
            row.message,
            row.attachment.as_ref().map(|v| v.to_string()).unwrap_or_default()
        ),
    }
}

/// Logs each report and keeps it in the `reports` table.
pub struct DbReporter<'a> {
    conn: &'a Connection,
}

impl<'a> DbReporter<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Reporter for DbReporter<'_> {
    fn report(&mut self, row: ReportRow) {
        log(&row);
        if let Err(e) = db::insert_report(self.conn, &row) {
            error!("Could not store {} report: {:#}", row.severity.as_str(), e);
        }
    }
}

/// Collects reports in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub rows: Vec<ReportRow>,
}

#[cfg(test)]
impl MemoryReporter {
    pub fn of(&self, severity: Severity) -> Vec<&ReportRow> {
        self.rows.iter().filter(|r| r.severity == severity).collect()
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn report(&mut self, row: ReportRow) {
        log(&row);
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_reporter_persists_all_severities() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let mut reporter = DbReporter::new(&conn);

        reporter.success("floor_log", "Saved 0 new floor updates");
        reporter.warning("floor_log", "Can't locate title of the floor log, can't go on.");
        reporter.failure("floor_log", "Failed to save 1 floor updates", serde_json::json!({ "failures": [] }));

        let stored = db::fetch_reports(&conn, 10).unwrap();
        let severities: Vec<_> = stored.iter().map(|r| r.severity.as_str()).collect();
        assert_eq!(severities, vec!["failure", "warning", "success"]);
        assert_eq!(stored[0].attachment.as_deref(), Some(r#"{"failures":[]}"#));
    }

    #[test]
    fn memory_reporter_keeps_failure_attachment() {
        let mut reporter = MemoryReporter::default();
        reporter.failure(
            "floor_log",
            "Failed to save 1 floor updates, attributes attached",
            serde_json::json!({ "failures": [{ "legislative_day": "2024-03-03" }] }),
        );

        let failures = reporter.of(Severity::Failure);
        assert_eq!(failures.len(), 1);
        let attached = failures[0].attachment.as_ref().unwrap();
        assert_eq!(attached["failures"][0]["legislative_day"], "2024-03-03");
    }

    #[test]
    fn db_reporter_survives_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let mut reporter = DbReporter::new(&conn);
        reporter.warning("floor_log", "no schema yet");
    }
}
