//! Fixture generator command line.
//!
//! # Usage
//!
//! ```bash
//! # Night sky over the default observer, right now
//! astral-gldf sky
//!
//! # Fixed instant, custom location and ceilings
//! astral-gldf sky --lat 40.71 --lng -74.01 --location "New York" \
//!   --mag 3.5 --json-mag 6.0 --at 2025-01-15T21:00:00Z
//!
//! # LED series from a base product archive
//! astral-gldf luminaire --base tests/data/aec_ga15.gldf --mode both
//! ```
//!
//! # Environment Variables
//!
//! - `ASTRAL_CATALOG_PATH`: Catalog file (plain or gzip CSV)
//! - `ASTRAL_EPHEMERIS`: `auto`, `approximate` or `precise`
//! - `ASTRAL_OUTPUT_DIR`: Output directory (default: tests/data)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use astral_gldf::config::GeneratorConfig;
use astral_gldf::pipeline::{
    run_series, BaseAssets, LuminaireMode, LuminaireSeries, SkyPipeline, SkyRequest,
};
use astral_gldf::time::parse_instant;
use astral_gldf::transformations::EphemerisStrategy;

#[derive(Debug, Parser)]
#[command(
    name = "astral-gldf",
    version,
    about = "Generate synthetic GLDF photometric fixtures"
)]
struct Cli {
    /// TOML config file (default: astral.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Night sky archive with one TM-33 file per visible star
    Sky(SkyArgs),
    /// LED luminaire series archives
    Luminaire(LuminaireArgs),
}

#[derive(Debug, clap::Args)]
struct SkyArgs {
    /// Observer latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Observer longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
    /// Location name used in the document and file name
    #[arg(long)]
    location: Option<String>,
    /// Magnitude ceiling for TM-33 files
    #[arg(long, allow_hyphen_values = true)]
    mag: Option<f64>,
    /// Magnitude ceiling for the sky summary
    #[arg(long = "json-mag", allow_hyphen_values = true)]
    json_mag: Option<f64>,
    /// Observation instant (RFC 3339 or YYYY-MM-DD HH:MM:SS); default now
    #[arg(long)]
    at: Option<String>,
    /// Star catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Horizon transform strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Output directory
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct LuminaireArgs {
    /// Base product archive providing geometry, photometry and image
    #[arg(long)]
    base: PathBuf,
    /// Composition strategy
    #[arg(long, value_enum, default_value_t = ModeArg::Both)]
    mode: ModeArg,
    /// Output directory
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Auto,
    Approximate,
    Precise,
}

impl From<StrategyArg> for EphemerisStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => EphemerisStrategy::Auto,
            StrategyArg::Approximate => EphemerisStrategy::Approximate,
            StrategyArg::Precise => EphemerisStrategy::Precise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Shared,
    Spectral,
    Both,
}

impl From<ModeArg> for LuminaireMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Shared => LuminaireMode::Shared,
            ModeArg::Spectral => LuminaireMode::Spectral,
            ModeArg::Both => LuminaireMode::Both,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::from_default_location().unwrap_or_else(|e| {
            debug!("{}, using built-in defaults", e);
            GeneratorConfig::default()
        }),
    };
    Ok(config.apply_env_overrides()?)
}

fn run_sky(mut config: GeneratorConfig, args: SkyArgs) -> Result<()> {
    // Command-line flags win over file and environment
    if let Some(lat) = args.lat {
        config.observer.latitude = lat;
    }
    if let Some(lng) = args.lng {
        config.observer.longitude = lng;
    }
    if let Some(location) = args.location {
        config.observer.location = location;
    }
    if let Some(mag) = args.mag {
        config.catalog.photometric_magnitude_limit = mag;
    }
    if let Some(json_mag) = args.json_mag {
        config.catalog.summary_magnitude_limit = json_mag;
    }
    if let Some(at) = args.at {
        parse_instant(&at).map_err(|e| anyhow::anyhow!("Invalid --at: {}", e))?;
        config.observer.instant = Some(at);
    }
    if let Some(catalog) = args.catalog {
        config.catalog.path = Some(catalog);
    }
    if let Some(strategy) = args.strategy {
        config.ephemeris.strategy = strategy.into();
    }
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    config.validate()?;

    let request = match SkyRequest::from_config(&config)? {
        Some(request) => request,
        None => SkyRequest::new(
            config.observer.location.clone(),
            config.observer.latitude,
            config.observer.longitude,
            Utc::now(),
        )
        .with_limits(
            config.catalog.photometric_magnitude_limit,
            config.catalog.summary_magnitude_limit,
        ),
    };

    info!(
        "Sky over {} ({:.2}, {:.2}) at {}",
        request.location,
        request.latitude,
        request.longitude,
        request.instant.to_rfc3339()
    );

    let pipeline = SkyPipeline::from_config(&config);
    let run = pipeline.run(&request)?;
    let path = config
        .output
        .directory
        .join(astral_gldf::pipeline::output_file_name(&request.location));
    let size = run
        .container
        .write_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Created {} ({} stars, {} bytes, catalog: {:?}, transform: {})",
        path.display(),
        run.photometric.len(),
        size,
        run.catalog_source,
        run.transform
    );
    Ok(())
}

fn run_luminaire(config: GeneratorConfig, args: LuminaireArgs) -> Result<()> {
    let assets = BaseAssets::from_archive(&args.base)?;
    let series = LuminaireSeries {
        author: config.output.author.clone(),
        ..LuminaireSeries::default()
    };
    let output_dir = args.output.unwrap_or(config.output.directory);

    for path in run_series(&series, &assets, args.mode.into(), &output_dir)? {
        println!("Created {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Sky(args) => run_sky(config, args),
        Command::Luminaire(args) => run_luminaire(config, args),
    }
}
