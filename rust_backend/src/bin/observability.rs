//! Observability CLI
//!
//! Builds the coverage model once and prints one JSON object per target.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin observability -- 279.23 38.78
//! cargo run --bin observability -- --config maps/coverage.toml 83.82 -5.39 266.42 -29.01
//! ```
//!
//! Without `--config`, `coverage.toml` is searched in the usual locations and
//! the built-in data layout is used when none is found.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sky_observability::{CoverageConfig, CoverageModel, ObservabilityResult, SkyPosition};

#[derive(Debug, Serialize)]
struct Report {
    ra_deg: f64,
    dec_deg: f64,
    #[serde(flatten)]
    result: ObservabilityResult,
}

struct Args {
    config: Option<PathBuf>,
    positions: Vec<SkyPosition>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut config = None;
    let mut numbers = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().context("--config requires a path")?;
            config = Some(PathBuf::from(path));
        } else {
            let value: f64 = arg
                .parse()
                .with_context(|| format!("Invalid angle '{}'", arg))?;
            numbers.push(value);
        }
    }

    if numbers.is_empty() || numbers.len() % 2 != 0 {
        bail!("Usage: observability [--config <path>] <ra_deg> <dec_deg> [<ra_deg> <dec_deg> ...]");
    }

    let positions = numbers
        .chunks(2)
        .map(|pair| SkyPosition::equatorial(pair[0], pair[1]))
        .collect();

    Ok(Args { config, positions })
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let config = match &args.config {
        Some(path) => CoverageConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => CoverageConfig::discover()?,
    };
    info!("Using coverage data from {}", config.data_dir.display());

    let model = CoverageModel::build(&config).context("Failed to build coverage model")?;

    for (position, result) in args.positions.iter().zip(model.evaluate_many(&args.positions)) {
        let report = Report {
            ra_deg: position.lon().value(),
            dec_deg: position.lat().value(),
            result: result?,
        };
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
