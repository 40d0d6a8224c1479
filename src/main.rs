//! CLI entry point for the auction Market Interest Index tool.
//!
//! Provides subcommands for scoring auction snapshots into the quarterly
//! index table and for comparing two quarters of a published table.

use anyhow::{Result, bail};
use auction_mii::analyzers::pipeline::run_pipeline;
use auction_mii::analyzers::sink::{ArtifactSink, NoopSink, S3Sink, publish};
use auction_mii::analyzers::temporal::percent_change;
use auction_mii::config::MiiConfig;
use auction_mii::fetch::{BasicClient, Location, load};
use auction_mii::output::{print_json, print_pretty, read_table, write_percent_change};
use auction_mii::parser::read_raw_records;
use auction_mii::quarter::Quarter;
use auction_mii::records::{DataSource, ProcessingContext, RawRecord};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "auction_mii")]
#[command(about = "Scores collector-car auction interest per quarter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score auction snapshots and publish the MII table
    Score {
        /// Primary snapshot(s): local path, http(s) URL or s3://bucket/key
        #[arg(short, long = "input", value_name = "LOCATION", required = true)]
        inputs: Vec<String>,

        /// Lower-trust snapshot(s), tagged as Cars & Bids
        #[arg(long = "cnb", value_name = "LOCATION")]
        cnb_inputs: Vec<String>,

        /// Directory to write the result CSVs to
        #[arg(short = 'd', long, default_value = "results")]
        output_dir: String,

        /// Optional: S3 bucket to upload the result CSVs to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress CSV files before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Optional: JSON file overriding scoring parameters
        #[arg(long)]
        config: Option<String>,
    },
    /// Compare entity indices between two quarters of a results table
    PctChange {
        /// Results CSV written by `score`
        #[arg(short, long, default_value = "results/mii_results_latest.csv")]
        results: String,

        /// Baseline quarter, e.g. 2025Q1
        #[arg(long)]
        baseline: Quarter,

        /// Comparison quarter, e.g. 2025Q2
        #[arg(long)]
        comparison: Quarter,

        /// Only keep makes containing this text (case-insensitive)
        #[arg(long)]
        make: Option<String>,

        /// Print rows as JSON instead of a text table
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Optional: also write the table to this CSV file
        #[arg(short, long)]
        output: Option<String>,

        /// Optional: JSON file overriding scoring parameters
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/auction_mii.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("auction_mii.log"));

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

    match cli.command {
        Commands::Score {
            inputs,
            cnb_inputs,
            output_dir,
            s3_bucket,
            gzip,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let ctx = ProcessingContext::new(Utc::now());

            let s3_client = if s3_bucket.is_some() || has_s3_location(&inputs, &cnb_inputs) {
                let aws = aws_config::load_from_env().await;
                Some(aws_sdk_s3::Client::new(&aws))
            } else {
                None
            };

            let raws = load_snapshots(&inputs, &cnb_inputs, s3_client.as_ref()).await?;
            let output = run_pipeline(&raws, &config, &ctx);
            print_pretty(&output.rows);

            let sink: Box<dyn ArtifactSink> = match (s3_bucket, s3_client) {
                (Some(bucket), Some(client)) => {
                    info!(bucket = %bucket, gzip, "S3 upload enabled");
                    Box::new(S3Sink::new(client, bucket, gzip))
                }
                _ => {
                    info!("S3 bucket not specified, skipping upload");
                    Box::new(NoopSink)
                }
            };

            let published = publish(&output.rows, &output_dir, sink.as_ref(), &ctx).await?;
            info!(
                rows = output.rows.len(),
                latest = %published.latest,
                "Score run finished"
            );
        }
        Commands::PctChange {
            results,
            baseline,
            comparison,
            make,
            json,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let rows = read_table(&results)?;
            let changes = percent_change(
                &rows,
                baseline,
                comparison,
                &config.percent_change,
                make.as_deref(),
            );
            info!(%baseline, %comparison, entities = changes.len(), "Percent change computed");

            if let Some(path) = output {
                write_percent_change(&path, &changes)?;
                info!(path = %path, "Wrote percent-change table");
            }

            if json {
                print_json(&changes)?;
            } else {
                println!(
                    "{:<48} {:<12} {:>10} {:>10} {:>10}",
                    "variant_id",
                    "cohort",
                    baseline.to_string(),
                    comparison.to_string(),
                    "pct"
                );
                for row in &changes {
                    println!(
                        "{:<48} {:<12} {:>10.2} {:>10.2} {:>9.1}%",
                        row.variant_id,
                        row.cohort,
                        row.mii_baseline,
                        row.mii_comparison,
                        row.pct_change
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<MiiConfig> {
    match path {
        Some(path) => {
            let config = MiiConfig::load(path)?;
            info!(path, "Loaded scoring config");
            Ok(config)
        }
        None => Ok(MiiConfig::default()),
    }
}

fn has_s3_location(inputs: &[String], cnb_inputs: &[String]) -> bool {
    inputs
        .iter()
        .chain(cnb_inputs)
        .any(|l| l.starts_with("s3://"))
}

/// Loads every snapshot, skipping any that cannot be read or parsed.
#[tracing::instrument(skip_all, fields(inputs = inputs.len(), cnb_inputs = cnb_inputs.len()))]
async fn load_snapshots(
    inputs: &[String],
    cnb_inputs: &[String],
    s3: Option<&aws_sdk_s3::Client>,
) -> Result<Vec<RawRecord>> {
    let http = BasicClient::new();
    let sources = inputs
        .iter()
        .map(|l| (l, DataSource::BringATrailer))
        .chain(cnb_inputs.iter().map(|l| (l, DataSource::CarsAndBids)));

    let mut raws = Vec::new();
    let mut loaded = 0usize;
    for (location, source) in sources {
        let result = async {
            let bytes = load(&Location::parse(location)?, &http, s3).await?;
            read_raw_records(bytes.as_slice(), source)
        }
        .await;

        match result {
            Ok(records) => {
                info!(location = %location, records = records.len(), "Snapshot loaded");
                loaded += 1;
                raws.extend(records);
            }
            Err(e) => warn!(location = %location, error = %e, "Skipping snapshot"),
        }
    }

    if loaded == 0 {
        bail!("no snapshot could be loaded");
    }
    Ok(raws)
}
