//! CLI entry point for the air-quality aggregator.
//!
//! Runs the HTTP service, takes a single reading, polls readings into a CSV
//! file, or reports which provider keys are configured.

use anyhow::Result;
use aq_aggregator::{
    api::{AppState, serve},
    config::{self, ProviderKeys},
    fetch::BasicClient,
    gateway::Gateway,
    model::Location,
    output::{append_reading, print_json},
    pipeline::aggregate,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aq_aggregator")]
#[command(about = "Aggregates ground, satellite and weather air-quality data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Seed for simulated data (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Take one aggregated reading and log it as JSON
    Reading {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long)]
        zip_code: Option<String>,

        /// Display name for the location
        #[arg(long)]
        name: Option<String>,
    },
    /// Poll readings on an interval and append them to a CSV file
    Sample {
        /// CSV file to append readings to
        #[arg(short, long, default_value = "readings.csv")]
        output: PathBuf,

        /// Seconds between readings
        #[arg(short, long, default_value_t = 300)]
        interval: u64,

        /// Number of readings to take (0 = infinite)
        #[arg(short, long, default_value_t = 1)]
        num_samples: usize,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long)]
        zip_code: Option<String>,
    },
    /// Report which provider API keys are configured
    CheckKeys,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aq_aggregator.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aq_aggregator.log"));

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
    let keys = ProviderKeys::from_env();

    match cli.command {
        Commands::Serve { bind, seed } => {
            let state = AppState::new(gateway(keys)?, seed);
            serve(bind, state).await?;
        }
        Commands::Reading {
            lat,
            lng,
            zip_code,
            name,
        } => {
            let location = Location::from_parts(lat, lng, name, zip_code);
            let reading = aggregate(&gateway(keys)?, location, Utc::now()).await;
            print_json(&reading)?;
        }
        Commands::Sample {
            output,
            interval,
            num_samples,
            lat,
            lng,
            zip_code,
        } => {
            let location = Location::from_parts(lat, lng, None, zip_code);
            sample(&gateway(keys)?, location, &output, interval, num_samples).await?;
        }
        Commands::CheckKeys => {
            for (provider, creds) in keys.iter() {
                info!(
                    %provider,
                    configured = creds.is_configured(),
                    base_url = %creds.base_url,
                    "Provider"
                );
            }
            let missing = keys.missing_keys();
            if missing.is_empty() {
                info!("All provider keys configured");
            } else {
                warn!(missing = ?missing, "Some providers will be skipped");
            }
        }
    }

    Ok(())
}

fn gateway(keys: ProviderKeys) -> Result<Gateway> {
    let client = BasicClient::with_timeout(config::upstream_timeout())?;
    Ok(Gateway::new(Arc::new(client), keys))
}

/// Takes a reading every `interval` seconds and appends each to `output`.
#[tracing::instrument(skip(gateway, location), fields(output = %output.display()))]
async fn sample(
    gateway: &Gateway,
    location: Location,
    output: &Path,
    interval: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(interval, "Sampling indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, interval, "Starting sample collection");
    }

    let mut sample_count = 0;
    loop {
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }
        sample_count += 1;

        let reading = aggregate(gateway, location.clone(), Utc::now()).await;
        if let Err(e) = append_reading(output, &reading) {
            error!(error = %e, "Failed to write reading");
        } else {
            info!(
                sample = sample_count,
                aqi = reading.measurements.aqi,
                source = %reading.source,
                "Reading recorded"
            );
        }

        if num_samples == 0 || sample_count < num_samples {
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!("Finished sampling");
    Ok(())
}
