//! CLI entry point for the warehouse metrics pipeline.
//!
//! Drives the fetch/aggregate pipeline the way the display front end would:
//! one-shot runs and a periodic-refresh loop, emitting the filtered series
//! and KPI stats as JSON.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use warehouse_metrics::{
    aggregate::MasterSeries,
    fetch::{BasicClient, RetryingFetcher, TokioSleeper},
    output::{RunReport, print_json, write_series_csv},
    pipeline::Pipeline,
    sources::default_sources,
    stats::summarize,
    window::{WINDOW_OPTIONS, filter_window},
};

#[derive(Parser)]
#[command(name = "warehouse_metrics")]
#[command(about = "Aggregates warehouse metric feeds into an hourly series", long_about = None)]
struct Cli {
    /// Base URL the feed CSVs are served under (falls back to METRICS_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all feeds once and print the windowed series and stats
    Run {
        /// Trailing window in days (one of 1, 3, 7, 14, 28)
        #[arg(short, long, default_value_t = 7)]
        window_days: u32,

        /// Optional CSV file to export the full master series to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Refresh the pipeline periodically, keeping the last good series
    /// across failed refreshes
    Watch {
        /// Trailing window in days (one of 1, 3, 7, 14, 28)
        #[arg(short, long, default_value_t = 7)]
        window_days: u32,

        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/warehouse_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("warehouse_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let base_url = cli
        .base_url
        .or_else(|| std::env::var("METRICS_BASE_URL").ok())
        .context("set --base-url or METRICS_BASE_URL")?;

    let pipeline = Pipeline::new(
        RetryingFetcher::new(BasicClient::new()),
        default_sources(&base_url),
    );

    match cli.command {
        Commands::Run {
            window_days,
            output,
        } => {
            check_window(window_days)?;

            let series = pipeline.run().await?;
            if let Some(path) = output {
                write_series_csv(&path, &series)?;
                info!(path, rows = series.len(), "Master series exported");
            }
            report(&series, window_days)?;
        }
        Commands::Watch {
            window_days,
            interval,
        } => {
            check_window(window_days)?;
            watch(&pipeline, window_days, interval).await?;
        }
    }

    Ok(())
}

fn check_window(window_days: u32) -> Result<()> {
    if !WINDOW_OPTIONS.contains(&window_days) {
        bail!("window must be one of {:?} days", WINDOW_OPTIONS);
    }
    Ok(())
}

/// Filters, summarizes, and prints one run's results.
fn report(series: &MasterSeries, window_days: u32) -> Result<()> {
    let filtered = filter_window(series, window_days);
    let stats = summarize(filtered);

    print_json(&RunReport {
        window_days,
        series: filtered,
        stats: &stats,
    })
}

/// Refresh loop: one pipeline run per tick, sequentially, so a new refresh
/// never overlaps a run still in flight. A failed refresh keeps the
/// previously reported series in place.
async fn watch(
    pipeline: &Pipeline<BasicClient, TokioSleeper>,
    window_days: u32,
    interval: u64,
) -> Result<()> {
    info!(interval, window_days, "Starting refresh loop");
    let mut last_good: Option<MasterSeries> = None;

    loop {
        match pipeline.run().await {
            Ok(series) => {
                report(&series, window_days)?;
                last_good = Some(series);
            }
            Err(e) => {
                error!(error = %e, "Refresh failed, keeping previous series");
                if let Some(series) = &last_good {
                    report(series, window_days)?;
                }
            }
        }

        info!(interval, "Waiting before next refresh");
        tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
    }
}
