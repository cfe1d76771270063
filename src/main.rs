use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use geo_tracker_rs::{
    AppController, DesiredAccuracy, EmailRequest, FileStore, LogStore, MailComposer, RawOptions,
    SimulatedBackgroundProvider, SimulatedForegroundProvider, Strategy, TrackerResult,
    TrackingSession,
};

#[derive(Parser, Debug)]
#[command(name = "geo_tracker")]
#[command(about = "Geo tracking session demo over simulated providers", long_about = None)]
struct Args {
    /// Tracking duration in seconds
    #[arg(value_name = "SECONDS", default_value = "5")]
    duration: u64,

    /// Tracking mode (js or native)
    #[arg(long, default_value = "js")]
    mode: String,

    /// Simulated fix interval in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// JS mode: maximum fix age in milliseconds (blank = provider default)
    #[arg(long, default_value = "")]
    maximum_age: String,

    /// JS mode: request high accuracy
    #[arg(long)]
    high_accuracy: bool,

    /// Native mode: desired accuracy in meters (0, 10, 100 or 1000)
    #[arg(long, default_value = "0")]
    accuracy: u32,

    /// Native mode: distance filter in meters (blank = default)
    #[arg(long, default_value = "")]
    distance_filter: String,

    /// Key-value store file holding the persisted log
    #[arg(long, default_value = "geo_tracker_store.json")]
    store: String,

    /// Clear the persisted log before starting
    #[arg(long)]
    clear: bool,

    /// Print the log as an email at the end instead of plain lines
    #[arg(long)]
    email: bool,
}

/// Demo stand-in for the platform mail composer
struct StdoutMail;

impl MailComposer for StdoutMail {
    fn compose(&self, request: EmailRequest) -> TrackerResult<()> {
        println!("Subject: {}", request.subject);
        println!("(html: {})", request.is_html);
        println!("{}", request.body.replace("<br>", "\n"));
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let strategy = match args.mode.as_str() {
        "js" => Strategy::JsPolling,
        "native" => Strategy::NativeBackground,
        other => bail!("Unknown mode {other:?} (expected js or native)"),
    };

    let desired_accuracy = match args.accuracy {
        0 => DesiredAccuracy::Best,
        10 => DesiredAccuracy::Ten,
        100 => DesiredAccuracy::Hundred,
        1000 => DesiredAccuracy::Thousand,
        other => bail!("Unsupported accuracy {other} (expected 0, 10, 100 or 1000)"),
    };

    let raw = RawOptions {
        maximum_age: args.maximum_age.clone(),
        high_accuracy: args.high_accuracy,
        desired_accuracy,
        distance_filter: args.distance_filter.clone(),
    };

    let storage = Arc::new(FileStore::open(&args.store)?);
    let log = Arc::new(LogStore::load(storage)?);

    let interval = Duration::from_millis(args.interval_ms);
    let session = TrackingSession::new(
        Arc::clone(&log),
        Arc::new(SimulatedForegroundProvider::new(interval)),
        Arc::new(SimulatedBackgroundProvider::new(interval)),
    );
    let controller = AppController::new(session, Arc::clone(&log), Arc::new(StdoutMail));

    if args.clear {
        controller.clear_log()?;
    }

    println!("Geo tracker demo: {} mode, {}s", strategy, args.duration);
    controller.on_app_start()?;

    let label = controller.toggle_tracking(strategy, &raw)?;
    println!("Toggle now shows: {label}");

    std::thread::sleep(Duration::from_secs(args.duration));

    let label = controller.toggle_tracking(strategy, &raw)?;
    println!("Toggle now shows: {label}");

    if args.email {
        controller.send_log_email()?;
    } else {
        println!("--- Log (newest first, stored at {}) ---", args.store);
        println!("{}", log.rendered()?.replace("<br>", "\n"));
    }

    Ok(())
}
