use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::record::{UpdateRecord, CHAMBER};
use crate::report::{ReportRow, Severity};

pub const DEFAULT_DB_PATH: &str = "data/floor_log.sqlite";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS floor_updates (
            id              INTEGER PRIMARY KEY,
            chamber         TEXT NOT NULL,
            legislative_day TEXT NOT NULL,
            timestamp       TEXT NOT NULL,
            events          TEXT NOT NULL,  -- JSON array
            bill_ids        TEXT NOT NULL,
            roll_ids        TEXT NOT NULL,
            bioguide_ids    TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_updates_day ON floor_updates(chamber, legislative_day);

        CREATE TABLE IF NOT EXISTS reports (
            id          INTEGER PRIMARY KEY,
            severity    TEXT NOT NULL CHECK(severity IN ('success','warning','failure')),
            source      TEXT NOT NULL,
            message     TEXT NOT NULL,
            attachment  TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_reports_severity ON reports(severity);
        ",
    )?;
    Ok(())
}

/// Read and write access to stored floor updates, as a run needs it.
pub trait UpdateStore {
    /// Every stored record for one legislative day.
    fn records_for_day(&self, legislative_day: &str) -> Result<Vec<UpdateRecord>>;
    fn save(&self, record: &UpdateRecord) -> Result<()>;
}

impl UpdateStore for Connection {
    fn records_for_day(&self, legislative_day: &str) -> Result<Vec<UpdateRecord>> {
        fetch_day(self, legislative_day)
    }

    fn save(&self, record: &UpdateRecord) -> Result<()> {
        insert_update(self, record).map(|_| ())
    }
}

// ── Floor updates ──

pub fn insert_update(conn: &Connection, r: &UpdateRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO floor_updates
         (chamber, legislative_day, timestamp, events, bill_ids, roll_ids, bioguide_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            r.chamber,
            r.legislative_day,
            r.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            serde_json::to_string(&r.events)?,
            serde_json::to_string(&r.bill_ids)?,
            serde_json::to_string(&r.roll_ids)?,
            serde_json::to_string(&r.bioguide_ids)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

type RawUpdate = (String, String, String, String, String, String, String);

pub fn fetch_day(conn: &Connection, legislative_day: &str) -> Result<Vec<UpdateRecord>> {
    let mut stmt = conn.prepare(
        "SELECT chamber, legislative_day, timestamp, events, bill_ids, roll_ids, bioguide_ids
         FROM floor_updates
         WHERE chamber = ?1 AND legislative_day = ?2
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map([CHAMBER, legislative_day], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<Result<Vec<RawUpdate>, _>>()?;

    rows.into_iter().map(decode_update).collect()
}

fn decode_update(raw: RawUpdate) -> Result<UpdateRecord> {
    let (chamber, legislative_day, timestamp, events, bill_ids, roll_ids, bioguide_ids) = raw;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .with_context(|| format!("Bad timestamp {:?} on {}", timestamp, legislative_day))?
        .with_timezone(&Utc);
    Ok(UpdateRecord {
        chamber,
        legislative_day,
        timestamp,
        events: serde_json::from_str(&events)?,
        bill_ids: serde_json::from_str(&bill_ids)?,
        roll_ids: serde_json::from_str(&roll_ids)?,
        bioguide_ids: serde_json::from_str(&bioguide_ids)?,
    })
}

// ── Reports ──

pub fn insert_report(conn: &Connection, r: &ReportRow) -> Result<i64> {
    let attachment = r.attachment.as_ref().map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO reports (severity, source, message, attachment) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![r.severity.as_str(), r.source, r.message, attachment],
    )?;
    Ok(conn.last_insert_rowid())
}

pub struct StoredReport {
    pub severity: String,
    pub source: String,
    pub message: String,
    pub attachment: Option<String>,
    pub created_at: String,
}

pub fn fetch_reports(conn: &Connection, limit: usize) -> Result<Vec<StoredReport>> {
    let mut stmt = conn.prepare(
        "SELECT severity, source, message, attachment, created_at
         FROM reports ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(StoredReport {
                severity: row.get(0)?,
                source: row.get(1)?,
                message: row.get(2)?,
                attachment: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub updates: usize,
    pub days: usize,
    pub latest_day: Option<String>,
    pub successes: usize,
    pub warnings: usize,
    pub failures: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let updates: usize = conn.query_row("SELECT COUNT(*) FROM floor_updates", [], |r| r.get(0))?;
    let days: usize = conn.query_row(
        "SELECT COUNT(DISTINCT legislative_day) FROM floor_updates",
        [],
        |r| r.get(0),
    )?;
    let latest_day: Option<String> =
        conn.query_row("SELECT MAX(legislative_day) FROM floor_updates", [], |r| r.get(0))?;
    let count_severity = |s: Severity| -> Result<usize> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE severity = ?1",
            [s.as_str()],
            |r| r.get(0),
        )?)
    };
    Ok(Stats {
        updates,
        days,
        latest_day,
        successes: count_severity(Severity::Success)?,
        warnings: count_severity(Severity::Warning)?,
        failures: count_severity(Severity::Failure)?,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::build_record;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn saved_records_read_back_by_day() {
        let conn = memory();
        let a = build_record("2024-03-03", "Senate convened.", ts("2024-03-03T15:00:00Z"), "118");
        let b = build_record("2024-03-03", "Senate agreed to H.Res. 123.", ts("2024-03-03T15:00:01Z"), "118");
        let other = build_record("2024-03-04", "Senate adjourned.", ts("2024-03-04T09:00:00Z"), "118");
        for r in [&a, &b, &other] {
            conn.save(r).unwrap();
        }

        let day = conn.records_for_day("2024-03-03").unwrap();
        assert_eq!(day, vec![a, b]);
        assert!(conn.records_for_day("2024-03-05").unwrap().is_empty());
    }

    #[test]
    fn subsecond_timestamps_survive() {
        let conn = memory();
        let r = build_record("2024-03-03", "Senate convened.", ts("2024-03-03T15:00:00.123456Z"), "118");
        conn.save(&r).unwrap();
        assert_eq!(conn.records_for_day("2024-03-03").unwrap()[0].timestamp, r.timestamp);
    }

    #[test]
    fn reports_and_stats() {
        let conn = memory();
        let r = build_record("2024-03-03", "Senate convened.", ts("2024-03-03T15:00:00Z"), "118");
        conn.save(&r).unwrap();
        insert_report(&conn, &ReportRow::new(Severity::Success, "floor_log", "Saved 1 new floor updates")).unwrap();
        insert_report(
            &conn,
            &ReportRow::new(Severity::Failure, "floor_log", "Failed to save 1 floor updates")
                .with_attachment(serde_json::json!({ "failures": [r] })),
        )
        .unwrap();

        let reports = fetch_reports(&conn, 10).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].severity, "failure");
        let attached: serde_json::Value =
            serde_json::from_str(reports[0].attachment.as_deref().unwrap()).unwrap();
        assert_eq!(attached["failures"][0]["events"][0], "Senate convened.");
        assert!(reports[1].attachment.is_none());

        let s = get_stats(&conn).unwrap();
        assert_eq!((s.updates, s.days), (1, 1));
        assert_eq!(s.latest_day.as_deref(), Some("2024-03-03"));
        assert_eq!((s.successes, s.warnings, s.failures), (1, 0, 1));
    }
}
