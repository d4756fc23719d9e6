//! CLI entry point for the inquiry analytics pipeline.
//!
//! Provides subcommands for a one-off analysis of an export, a periodic
//! watch loop with manual refresh triggers, and paging through leads.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquiry_pulse::analyzers::leads::paginate;
use inquiry_pulse::config::AppConfig;
use inquiry_pulse::fetch::{BasicClient, load_source};
use inquiry_pulse::output::{
    RunRecord, append_record, log_json, log_lead_page, log_summary, write_snapshot,
};
use inquiry_pulse::pipeline::Pipeline;
use inquiry_pulse::refresh::Refresher;
use inquiry_pulse::snapshot::Snapshot;
use std::ffi::OsStr;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "inquiry_pulse")]
#[command(about = "Analytics over a shared customer inquiry sheet", long_about = None)]
struct Cli {
    /// TOML config file (defaults apply to anything it leaves out)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and analyze the export once
    Analyze {
        /// Path to file or URL to fetch (defaults to the configured source)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Sheet id to build the export URL from
        #[arg(long)]
        sheet_id: Option<String>,

        /// CSV run log to append results to
        #[arg(short, long, default_value = "run_log.csv")]
        output: String,

        /// Optional: write the snapshot as JSON to this path
        #[arg(long)]
        json: Option<String>,

        /// Gzip compress the JSON snapshot
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Also log the full snapshot as pretty JSON
        #[arg(long, default_value_t = false)]
        print_json: bool,
    },
    /// Refresh periodically; press Enter to trigger a refresh manually
    Watch {
        /// Path to file or URL to fetch (defaults to the configured source)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Sheet id to build the export URL from
        #[arg(long)]
        sheet_id: Option<String>,

        /// Refresh interval in seconds (overrides the config file)
        #[arg(short = 'r', long)]
        interval: Option<u64>,

        /// Number of scheduled refreshes (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        num_samples: usize,

        /// CSV run log to append results to
        #[arg(short, long, default_value = "run_log.csv")]
        output: String,

        /// Optional: rewrite the snapshot JSON here after every refresh
        #[arg(long)]
        json: Option<String>,

        /// Gzip compress the JSON snapshot
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Print one page of validated leads, newest first
    Leads {
        /// Path to file or URL to fetch (defaults to the configured source)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Sheet id to build the export URL from
        #[arg(long)]
        sheet_id: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 20)]
        per_page: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/inquiry_pulse.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("inquiry_pulse.log"));

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

    let config_path = cli.config.or_else(|| std::env::var("INQUIRY_CONFIG").ok());
    let mut config = AppConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            source,
            sheet_id,
            output,
            json,
            gzip,
            print_json,
        } => {
            let source = resolve_source(&mut config, source, sheet_id)?;
            let refresher = build_refresher(&config, source)?;

            refresher.refresh().await;
            let snapshot = refresher.current();
            publish(&snapshot, &output, json.as_deref(), gzip);
            if print_json {
                log_json(&snapshot)?;
            }
        }
        Commands::Watch {
            source,
            sheet_id,
            interval,
            num_samples,
            output,
            json,
            gzip,
        } => {
            let source = resolve_source(&mut config, source, sheet_id)?;
            let interval = Duration::from_secs(interval.unwrap_or(config.refresh.interval_secs));
            watch(&config, source, interval, num_samples, output, json, gzip).await?;
        }
        Commands::Leads {
            source,
            sheet_id,
            page,
            per_page,
        } => {
            let source = resolve_source(&mut config, source, sheet_id)?;
            let client = build_client(&config)?;
            let pipeline = Pipeline::new(config.pipeline.clone())?;

            let text = load_source(&client, &source)
                .await
                .with_context(|| format!("Failed to load {source}"))?;
            let out = pipeline.analyze(&text, Utc::now().date_naive());

            log_lead_page(&paginate(&out.leads, page, per_page));
        }
    }

    Ok(())
}

/// Picks the source from the CLI, then `SHEET_SOURCE`, then the config file.
fn resolve_source(
    config: &mut AppConfig,
    source: Option<String>,
    sheet_id: Option<String>,
) -> Result<String> {
    if let Some(id) = sheet_id {
        config.source.sheet_id = Some(id);
        config.source.url = None;
    }
    if let Some(src) = source.or_else(|| std::env::var("SHEET_SOURCE").ok()) {
        return Ok(src);
    }
    match config.source.export_url() {
        Some(url) => Ok(url),
        None => bail!(
            "No source given: pass FILE_OR_URL, --sheet-id, SHEET_SOURCE or [source] in the config"
        ),
    }
}

fn build_client(config: &AppConfig) -> Result<BasicClient> {
    Ok(BasicClient::new(
        Duration::from_secs(config.refresh.connect_timeout_secs),
        Duration::from_secs(config.refresh.fetch_timeout_secs),
    )?)
}

fn build_refresher(config: &AppConfig, source: String) -> Result<Refresher<BasicClient>> {
    let client = build_client(config)?;
    let pipeline = Pipeline::new(config.pipeline.clone())?;
    Ok(Refresher::new(client, source, pipeline, config.refresh.clone()))
}

/// Logs a snapshot and persists it to the run log and optional JSON file.
fn publish(snapshot: &Snapshot, output: &str, json: Option<&str>, gzip: bool) {
    if snapshot.is_demo() {
        warn!("Showing demonstration data, live data is unavailable");
    }
    log_summary(snapshot);

    if let Err(e) = append_record(output, &RunRecord::from_snapshot(snapshot)) {
        error!(error = %e, path = output, "Failed to append run record");
    }
    if let Some(path) = json {
        if let Err(e) = write_snapshot(path, snapshot, gzip) {
            error!(error = %e, path, "Failed to write snapshot");
        } else {
            info!(path, gzip, "Snapshot written");
        }
    }
}

/// Forwards each stdin line as a refresh trigger. Triggers arriving while
/// one is already queued are dropped.
///
/// Reads on a plain thread: a read blocked on an open stdin must not hold up
/// runtime shutdown.
fn spawn_stdin_triggers() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            match tx.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Closed(())) => break,
            }
        }
    });
    rx
}

/// Periodic refresh with manual triggers from stdin, until the sample limit
/// is reached or Ctrl+C.
#[tracing::instrument(skip(config, output, json), fields(interval_secs = interval.as_secs()))]
async fn watch(
    config: &AppConfig,
    source: String,
    interval: Duration,
    num_samples: usize,
    output: String,
    json: Option<String>,
    gzip: bool,
) -> Result<()> {
    let refresher = build_refresher(config, source)?;

    let mut rx = refresher.subscribe();
    let publisher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            publish(&snapshot, &output, json.as_deref(), gzip);
        }
    });

    if num_samples == 0 {
        info!("Refreshing indefinitely. Press Enter to refresh now, Ctrl+C to stop.");
    }

    let triggers = spawn_stdin_triggers();
    tokio::select! {
        _ = refresher.run_with_triggers(interval, num_samples, triggers) => {
            info!(num_samples, "Finished scheduled refreshes");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    // last sender gone: the publisher drains the final snapshot and exits
    drop(refresher);
    let _ = publisher.await;

    Ok(())
}
