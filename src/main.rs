use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use campusnav::inference::{RtenClassifier, RtenYoloDetector};
use campusnav::{AppConfig, ErrorReport, LocateError, LocationReport, Locator};

#[derive(Parser)]
#[command(name = "campusnav")]
#[command(about = "Recognize campus buildings in photos and estimate their distance and location")]
struct Cli {
    /// Image files to process
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// TOML configuration file (built-in campus table if omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Classifier model (.rten), overrides [classifier].model
    #[arg(long, value_name = "FILE")]
    classifier_model: Option<PathBuf>,

    /// Object detector model (.rten), overrides [detector].model
    #[arg(long, value_name = "FILE")]
    detector_model: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save fallback detector intermediates to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Pretty-print JSON records
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Record {
    Located {
        image: String,
        #[serde(flatten)]
        report: LocationReport,
    },
    Failed {
        image: String,
        #[serde(flatten)]
        error: ErrorReport,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let filter = if args.verbose { "campusnav=debug" } else { "campusnav=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::builtin()?,
    };
    info!("Configuration loaded ({} buildings)", config.buildings.len());

    let classifier_path = args
        .classifier_model
        .clone()
        .or_else(|| config.classifier.model.clone())
        .context("No classifier model given (use --classifier-model or [classifier].model)")?;
    let detector_path = args
        .detector_model
        .clone()
        .or_else(|| config.detector.model.clone())
        .context("No detector model given (use --detector-model or [detector].model)")?;

    let classifier = RtenClassifier::load(&classifier_path, config.classifier.input_size)?;
    let detector = RtenYoloDetector::load(&detector_path, config.detector.clone())?;
    info!("Models loaded");

    let mut locator = Locator::new(&config, Arc::new(classifier), Arc::new(detector));
    if let Some(debug_dir) = args.debug_out.clone() {
        locator = locator.with_debug(debug_dir)?;
    }
    let locator = Arc::new(locator);

    let handles: Vec<_> = args
        .images
        .iter()
        .cloned()
        .map(|path| {
            let locator = Arc::clone(&locator);
            tokio::task::spawn_blocking(move || {
                info!("Received image {}", path.display());
                let result = std::fs::read(&path)
                    .map_err(|e| LocateError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))
                    .and_then(|bytes| locator.locate_bytes(&bytes));
                (path, result)
            })
        })
        .collect();

    for handle in handles {
        let (path, result) = handle.await.context("Image task panicked")?;
        let image = path.display().to_string();
        let record = match result {
            Ok(report) => Record::Located { image, report },
            Err(e) => {
                error!("{}: {}", image, e);
                Record::Failed { image, error: ErrorReport::from(&e) }
            }
        };

        let line = if args.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{}", line);
    }

    Ok(())
}
