use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::db::UpdateStore;
use crate::fetch::{DocumentSource, FetchError};
use crate::merge;
use crate::parser;
use crate::record::{build_record, UpdateRecord};
use crate::report::Reporter;

/// Name reports are filed under.
pub const SOURCE: &str = "floor_updates_live_senate";

pub struct RunOptions {
    pub session: String,
    /// Print duplicates and new saves to stdout.
    pub debug: bool,
}

/// Why a run stopped before looking at any update.
#[derive(Debug, Error)]
pub enum AbortReason {
    #[error("Network error on fetching the floor log, can't go on. ({0})")]
    Fetch(#[from] FetchError),
    #[error("Can't locate title of the floor log, can't go on.")]
    TitleNotFound,
    #[error("Can't read stored floor updates for {day}, can't go on. ({reason})")]
    Store { day: String, reason: String },
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub saved: Vec<UpdateRecord>,
    pub failures: Vec<UpdateRecord>,
    pub duplicates: usize,
    pub anomalies: usize,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    Aborted(AbortReason),
}

/// One pass: fetch the live log, then record whatever updates are new.
pub async fn run<S, St, R, C>(
    source: &S,
    store: &St,
    reporter: &mut R,
    clock: &mut C,
    opts: &RunOptions,
) -> RunOutcome
where
    S: DocumentSource,
    St: UpdateStore,
    R: Reporter,
    C: Clock,
{
    match source.fetch().await {
        Ok(html) => process(&html, store, reporter, clock, opts).await,
        Err(e) => abort(reporter, e.into()),
    }
}

/// Segment an already fetched log and persist its new updates.
pub async fn process<St, R, C>(
    html: &str,
    store: &St,
    reporter: &mut R,
    clock: &mut C,
    opts: &RunOptions,
) -> RunOutcome
where
    St: UpdateStore,
    R: Reporter,
    C: Clock,
{
    let segmented = match parser::process_document(html) {
        Ok(s) => s,
        Err(_) => return abort(reporter, AbortReason::TitleNotFound),
    };
    info!(
        "Segmented {} updates across {} legislative days",
        segmented.update_count(),
        segmented.days.len()
    );

    for anomaly in &segmented.anomalies {
        reporter.warning(SOURCE, format!("Unexpected HTML, {}", anomaly));
    }

    // Read every day's known texts before writing anything, so a store error
    // aborts the run cleanly.
    let mut known: BTreeMap<&str, HashSet<String>> = BTreeMap::new();
    for day in segmented.days.keys() {
        match store.records_for_day(day) {
            Ok(records) => {
                known.insert(day.as_str(), records.into_iter().flat_map(|r| r.events).collect());
            }
            Err(e) => {
                return abort(
                    reporter,
                    AbortReason::Store {
                        day: day.clone(),
                        reason: format!("{:#}", e),
                    },
                )
            }
        }
    }

    let mut summary = RunSummary {
        anomalies: segmented.anomalies.len(),
        ..Default::default()
    };

    for (day, items) in &segmented.days {
        let todays = &known[day.as_str()];
        let fresh = merge::new_items(todays, items);

        for item in merge::skipped_items(todays, items) {
            summary.duplicates += 1;
            debug!("Duplicate on {}: {}", day, item);
            if opts.debug {
                println!("Found a dupe, ignoring");
            }
        }

        for text in fresh {
            let record = build_record(day, text, clock.now(), &opts.session);
            match store.save(&record) {
                Ok(()) => {
                    if opts.debug {
                        println!(
                            "[{}] New floor update on leg. day {}",
                            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            day
                        );
                    }
                    summary.saved.push(record);
                    clock.pause().await;
                }
                Err(e) => {
                    warn!("Failed to save floor update, will file report: {:#}", e);
                    summary.failures.push(record);
                }
            }
        }
    }

    if !summary.failures.is_empty() {
        reporter.failure(
            SOURCE,
            format!(
                "Failed to save {} floor updates, attributes attached",
                summary.failures.len()
            ),
            json!({ "failures": summary.failures }),
        );
    }
    reporter.success(SOURCE, format!("Saved {} new floor updates", summary.saved.len()));

    RunOutcome::Completed(summary)
}

/// Start `pass` every `period` until `shutdown` resolves, also while a pass is in
/// flight. Passes never overlap. Returns how many passes finished.
pub async fn watch<F, Fut>(period: Duration, shutdown: impl Future<Output = ()>, mut pass: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut finished = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }
        tokio::select! {
            biased;
            _ = pass() => finished += 1,
            _ = &mut shutdown => {
                warn!("Interrupted during a run, stopping");
                break;
            }
        }
    }
    finished
}

fn abort<R: Reporter>(reporter: &mut R, reason: AbortReason) -> RunOutcome {
    reporter.warning(SOURCE, reason.to_string());
    RunOutcome::Aborted(reason)
}

// ── Tests ──
