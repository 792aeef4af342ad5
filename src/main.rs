//! ChargeWatch - charging status watcher with throttled SMS notifications
//!
//! Classifies a device's charging state from recognized on-screen text and
//! notifies configured phone numbers, at most once per hour and outcome.

mod analysis;
mod app;
mod capture;
mod config;
mod error;
mod notify;
mod storage;
mod vision;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::{ChargeWatchApp, Scheduler};
use crate::capture::FrameSource;
use crate::config::{AppConfig, WatchConfig};
use crate::notify::LogTransport;
use crate::storage::{NotificationLedger, OutcomeType};
use crate::vision::ReplayRecognizer;

/// ChargeWatch - charging status notifier
#[derive(Parser, Debug)]
#[command(name = "charge-watch")]
#[command(about = "Watches recognized screen text for charging status and sends throttled notifications")]
struct Args {
    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run classification cycles
    Run {
        /// JSON detections written by the recognition engine
        #[arg(short, long)]
        detections: PathBuf,

        /// Image file re-read as the frame for each cycle
        #[arg(short, long)]
        frame: Option<PathBuf>,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Seconds between cycles (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Evaluate a single cycle at this local time (yyyy-mm-ddTHH:MM)
        #[arg(long, value_parser = parse_time)]
        at: Option<NaiveDateTime>,
    },
    /// Show marker counts for an hour bucket
    Markers {
        /// Date (yyyy-mm-dd), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Hour of day, defaults to the current hour
        #[arg(long)]
        hour: Option<u32>,
    },
    /// Write the default configuration file
    InitConfig,
}

fn parse_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = match args.config {
        Some(path) => path,
        None => storage::get_config_dir()?.join("config.toml"),
    };

    match args.command {
        Command::InitConfig => {
            config::save_config(&AppConfig::default(), &config_path)
                .with_context(|| format!("Failed to write {:?}", config_path))?;
            println!("Wrote default configuration to {}", config_path.display());
            Ok(())
        }
        Command::Markers { date, hour } => {
            let config = load_or_default_config(&config_path);
            show_markers(&config, date, hour)
        }
        Command::Run {
            detections,
            frame,
            once,
            interval,
            at,
        } => {
            let config = load_or_default_config(&config_path);
            run(&config, detections, frame, once, interval, at)
        }
    }
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(path: &Path) -> AppConfig {
    if path.exists() {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => tracing::warn!("Ignoring unreadable configuration {:?}: {}", path, e),
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

fn run(
    config: &AppConfig,
    detections: PathBuf,
    frame: Option<PathBuf>,
    once: bool,
    interval: Option<u64>,
    at: Option<NaiveDateTime>,
) -> Result<()> {
    let watch = WatchConfig::load(config).context("Failed to load watch configuration")?;
    let ledger = NotificationLedger::new(storage::open_store(config)?);
    let transport = LogTransport::new(watch.dispatch.segment_chars);
    let app = ChargeWatchApp::new(
        watch,
        ledger,
        Box::new(ReplayRecognizer::new(detections)),
        Box::new(transport),
    );
    let frames = frame.map(FrameSource::File).unwrap_or_default();

    if once || at.is_some() {
        let now = at.unwrap_or_else(|| Local::now().naive_local());
        let outcome = app.run_cycle(&frames.next_frame()?, now)?;
        print!("{}", outcome.report);
        println!(
            "observations={} charging={} matches={} decision={:?} delivered={} failed={}",
            outcome.observations.len(),
            outcome.classification.charging,
            outcome.classification.match_count,
            outcome.decision,
            outcome.dispatch.delivered.len(),
            outcome.dispatch.failures.len()
        );
        return Ok(());
    }

    let interval = Duration::from_secs(interval.unwrap_or(config.schedule.interval_secs).max(1));
    let mut scheduler = Scheduler::new(interval);
    scheduler.run(&app, &frames, &crossbeam_channel::never());
    Ok(())
}

fn show_markers(config: &AppConfig, date: Option<NaiveDate>, hour: Option<u32>) -> Result<()> {
    let now = Local::now().naive_local();
    let date = date.unwrap_or_else(|| now.date());
    let hour = hour.unwrap_or_else(|| now.hour());

    let ledger = NotificationLedger::new(storage::open_store(config)?);
    for outcome in [OutcomeType::Success, OutcomeType::Failure] {
        let count = ledger.count_markers(date, hour, outcome)?;
        println!("{} {:02}h {}: {}", date, hour, outcome, count);
    }
    Ok(())
}
