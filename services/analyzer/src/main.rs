//! Parcel imagery color analyzer.
//!
//! Classifies a rendered NDVI/NDMI image into legend buckets:
//! - Built-in or file-based palettes, or an explicit ranges file
//! - Dynamic clustering when the palette explains too little of the image
//! - JSON or table output; failures reported as JSON with a non-zero exit

mod output;
mod ranges;

use std::path::PathBuf;
use std::sync::Arc;

use agro_common::AnalysisFailure;
use anyhow::Result;
use clap::Parser;
use raster_analysis::{AnalysisConfig, AnalysisMode, ImageAnalyzer};
use storage::ImageCache;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use output::OutputFormat;
use ranges::{resolve_ranges, RangeSource};

#[derive(Parser, Debug)]
#[command(name = "analyzer")]
#[command(about = "Color classification of vegetation and moisture index imagery")]
struct Args {
    /// Image to analyze: http(s) URL, data URI, or local path
    #[arg(short, long)]
    image: String,

    /// Palette key (built-in: ndvi, ndmi)
    #[arg(short, long, default_value = "ndvi", conflicts_with = "ranges")]
    palette: String,

    /// JSON file with an array of color ranges, used instead of a palette
    #[arg(short, long)]
    ranges: Option<PathBuf>,

    /// JSON palette configuration to look the palette key up in
    #[arg(long, env = "PALETTE_FILE")]
    palette_file: Option<PathBuf>,

    /// Predefined ranges only, never fall back to clustering
    #[arg(long)]
    basic: bool,

    /// Maximum number of dynamic clusters
    #[arg(long)]
    clusters: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // Logs go to stderr so stdout stays machine readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = AnalysisConfig::from_env();
    if let Some(clusters) = args.clusters {
        config.max_clusters = clusters;
    }

    let mode = if args.basic {
        AnalysisMode::Basic
    } else {
        AnalysisMode::Advanced
    };

    info!(image = %args.image, ?mode, "Starting color analysis");

    match run(&args, config, mode).await {
        Ok(rendered) => {
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Color analysis failed");
            let failure = AnalysisFailure::from(&e);
            println!("{}", serde_json::to_string_pretty(&failure)?);
            std::process::exit(1);
        }
    }
}

async fn run(
    args: &Args,
    config: AnalysisConfig,
    mode: AnalysisMode,
) -> agro_common::AnalysisResult<String> {
    let source = match &args.ranges {
        Some(path) => RangeSource::File(path),
        None => RangeSource::Palette {
            key: &args.palette,
            palette_file: args.palette_file.as_deref(),
        },
    };
    let ranges = resolve_ranges(source)?;

    let analyzer = if config.image_cache_size_mb > 0 {
        let cache = Arc::new(ImageCache::new(
            config.image_cache_size_mb,
            config.image_cache_ttl_secs,
        ));
        ImageAnalyzer::with_cache(config, cache)?
    } else {
        ImageAnalyzer::new(config)?
    };

    let outcome = analyzer.analyze(&args.image, &ranges, mode).await?;

    output::render(&outcome, args.format).map_err(agro_common::AnalysisError::from)
}
