mod clock;
mod db;
mod fetch;
mod merge;
mod parser;
mod record;
mod report;
mod runner;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::{info, warn};

use clock::{SteppedClock, SystemClock};
use fetch::HttpSource;
use report::DbReporter;
use runner::{RunOptions, RunOutcome};

#[derive(Parser)]
#[command(name = "floor_log", about = "Senate floor log scraper")]
struct Cli {
    /// SQLite database holding floor updates and reports
    #[arg(long, env = "FLOOR_LOG_DB", default_value = db::DEFAULT_DB_PATH, global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Floor log page
    #[arg(long, env = "FLOOR_LOG_URL", default_value = fetch::DEFAULT_URL)]
    url: String,
    /// Fetch timeout in seconds
    #[arg(long, env = "FLOOR_LOG_TIMEOUT", default_value = "30")]
    timeout: u64,
    /// Congress number for bill ids (default: derived from the current year)
    #[arg(long, env = "FLOOR_LOG_SESSION")]
    session: Option<String>,
    /// Print duplicates and new saves
    #[arg(long)]
    debug: bool,
    /// Don't wait between saves; timestamps are spaced synthetically instead
    #[arg(long)]
    no_pause: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the floor log once and save new updates
    Run(RunArgs),
    /// Scrape repeatedly on a fixed interval
    Watch {
        #[command(flatten)]
        run: RunArgs,
        /// Seconds between runs
        #[arg(short, long, default_value = "300")]
        interval: u64,
    },
    /// List stored updates for a legislative day
    Show {
        /// YYYY-MM-DD (default: latest stored day)
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Most recent run reports
    Reports {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
}

impl Commands {
    fn debug(&self) -> bool {
        match self {
            Commands::Run(args) | Commands::Watch { run: args, .. } => args.debug,
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.command.debug() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let t0 = Instant::now();
    let conn = db::connect(&cli.db)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Run(args) => {
            let outcome = run_once(&conn, &args).await?;
            print_outcome(&outcome);
        }
        Commands::Watch { run, interval } => {
            info!("Watching {} every {}s (ctrl-c to stop)", run.url, interval);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Could not listen for ctrl-c: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let (conn, run) = (&conn, &run);
            let passes = runner::watch(Duration::from_secs(interval.max(1)), shutdown, || async move {
                match run_once(conn, run).await {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(e) => warn!("Run could not start: {:#}", e),
                }
            })
            .await;
            info!("Stopped after {} runs", passes);
        }
        Commands::Show { day } => {
            let day = match day {
                Some(d) => d,
                None => match db::get_stats(&conn)?.latest_day {
                    Some(d) => d,
                    None => {
                        println!("No floor updates stored yet. Run 'run' first.");
                        return Ok(());
                    }
                },
            };
            let records = db::fetch_day(&conn, &day)?;
            if records.is_empty() {
                println!("No floor updates for {}.", day);
                return Ok(());
            }
            println!("{} ({} updates)", day, records.len());
            println!("{}", "-".repeat(80));
            for r in &records {
                println!(
                    "[{}] {}",
                    r.timestamp.format("%H:%M:%S"),
                    r.events.join(" / ")
                );
                if !r.bill_ids.is_empty() {
                    println!("           bills: {}", r.bill_ids.join(", "));
                }
            }
        }
        Commands::Reports { limit } => {
            let rows = db::fetch_reports(&conn, limit)?;
            if rows.is_empty() {
                println!("No reports.");
                return Ok(());
            }
            for r in &rows {
                println!(
                    "{} | {:<7} | {}",
                    r.created_at,
                    r.severity,
                    truncate(&r.message, 90)
                );
                if let Some(a) = &r.attachment {
                    println!("    {}", truncate(a, 120));
                }
            }
            println!("\n{} reports (source: {})", rows.len(), rows[0].source);
        }
        Commands::Stats => {
            let s = db::get_stats(&conn)?;
            println!("Updates:    {}", s.updates);
            println!("Days:       {}", s.days);
            println!("Latest day: {}", s.latest_day.as_deref().unwrap_or("-"));
            println!("Successes:  {}", s.successes);
            println!("Warnings:   {}", s.warnings);
            println!("Failures:   {}", s.failures);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

async fn run_once(conn: &Connection, args: &RunArgs) -> anyhow::Result<RunOutcome> {
    let source = HttpSource::new(&args.url, Duration::from_secs(args.timeout))?;
    let opts = RunOptions {
        session: args
            .session
            .clone()
            .unwrap_or_else(parser::extract::current_session),
        debug: args.debug,
    };
    let mut reporter = DbReporter::new(conn);

    let outcome = if args.no_pause {
        let mut clock = SteppedClock::starting_at(chrono::Utc::now());
        runner::run(&source, conn, &mut reporter, &mut clock, &opts).await
    } else {
        let mut clock = SystemClock::default();
        runner::run(&source, conn, &mut reporter, &mut clock, &opts).await
    };
    Ok(outcome)
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(s) => println!(
            "Saved {} new floor updates ({} already known, {} anomalies, {} failed).",
            s.saved.len(),
            s.duplicates,
            s.anomalies,
            s.failures.len()
        ),
        RunOutcome::Aborted(reason) => println!("Run aborted: {}", reason),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
