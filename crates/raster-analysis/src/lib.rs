//! Color classification of rendered index rasters.
//!
//! Turns an NDVI/NDMI style raster into legend buckets:
//! - Pixel sampling over decoded RGBA (transparent pixels skipped)
//! - First-match classification against caller-supplied color ranges
//! - Dynamic clustering fallback when the ranges explain too little
//! - Percentages over the analyzed pixels
//!
//! # Example
//!
//! ```ignore
//! use raster_analysis::{AnalysisConfig, ImageAnalyzer};
//! use agro_common::Palette;
//!
//! let analyzer = ImageAnalyzer::new(AnalysisConfig::from_env())?;
//! let outcome = analyzer
//!     .analyze_image_by_color_advanced("https://tiles.example.com/ndvi.png", &Palette::ndvi().ranges)
//!     .await?;
//! for entry in &outcome.results {
//!     println!("{}: {}%", entry.name, entry.percent_label());
//! }
//! ```

pub mod aggregate;
pub mod analyze;
pub mod analyzer;
pub mod classifier;
pub mod cluster;
pub mod config;
pub mod outcome;
pub mod raster;
pub mod source;

pub use aggregate::ClassificationResult;
pub use analyze::{analyze_raster, AnalysisMode, AnalysisStage};
pub use analyzer::ImageAnalyzer;
pub use classifier::{ClassificationTally, Classifier};
pub use cluster::{agricultural_label, assign_unique_labels, ColorCluster, ColorClusterer};
pub use config::AnalysisConfig;
pub use outcome::{AnalysisMetadata, AnalysisOutcome, AnalysisType};
pub use raster::{DecodedRaster, PixelSample};
pub use source::{decode_raster, ImageLoader, ImageSource};
