//! Leaderboard Export Tool
//!
//! Run with:
//! cargo run --bin export_leaderboard --release -- --since 2026-03-01 --out leaderboard.csv

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use sqlx::postgres::PgPoolOptions;

use sec_incentives::config::{parse_window_bound, IncentiveSettings};
use sec_incentives::engine::{IncentiveAggregator, Leaderboard, LeaderboardFilter, ReportWindow};
use sec_incentives::export::write_leaderboard_csv;
use sec_incentives::snapshot::{load_snapshot, PgSnapshotSource};

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let settings = IncentiveSettings::from_env()?;

    let start = match arg_value(&args, "--since") {
        Some(raw) => parse_window_bound(raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid --since value: {}", raw))?,
        None => settings.default_window_start.ok_or_else(|| {
            anyhow::anyhow!("--since is required when INCENTIVE_WINDOW_START is unset")
        })?,
    };
    let window = match arg_value(&args, "--until") {
        Some(raw) => {
            let end = parse_window_bound(raw)
                .ok_or_else(|| anyhow::anyhow!("Invalid --until value: {}", raw))?;
            ReportWindow::between(start, end)?
        }
        None => ReportWindow::starting_at(start),
    };
    let out_path = arg_value(&args, "--out").unwrap_or("leaderboard.csv");

    let database_url = std::env::var("DATABASE_URL")?;

    println!("Leaderboard Export - sales since {}", window.start);
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    let timer = Instant::now();
    let source = PgSnapshotSource::new(pool.clone());
    let snapshot = load_snapshot(&source, &window, &settings.manual_bonus_phones).await?;

    let aggregator = IncentiveAggregator::new(settings.rules.clone());
    let outcome = aggregator.aggregate_window(
        &snapshot.events,
        &snapshot.roster,
        settings.manual_bonus_phones.as_slice(),
        window,
    );

    let rows = Leaderboard::from_people(&outcome.people).filtered(&LeaderboardFilter::default());
    let file = BufWriter::new(File::create(out_path)?);
    write_leaderboard_csv(file, &rows)?;

    pool.close().await;

    println!("\n=== Export Results ===");
    println!("Events considered: {}", outcome.stats.events_considered);
    println!("Unattributed events: {}", outcome.stats.events_unattributed);
    println!("Skipped roster entries: {}", outcome.stats.roster_skipped);
    println!("Rows written: {}", rows.len());
    println!("Output: {}", out_path);
    println!("Time: {:.2}s", timer.elapsed().as_secs_f64());

    Ok(())
}
