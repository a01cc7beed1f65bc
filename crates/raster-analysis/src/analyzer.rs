//! Asynchronous entry point: image source in, legend data out.

use agro_common::{validate_ranges, AnalysisError, AnalysisResult, ColorRange};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::ImageCache;
use tracing::{debug, info, instrument, warn};

use crate::analyze::{analyze_raster, AnalysisMode, AnalysisStage};
use crate::config::AnalysisConfig;
use crate::outcome::AnalysisOutcome;
use crate::source::{decode_raster, ImageLoader, ImageSource};

/// Runs color analyses against image sources.
///
/// Each call is independent: it validates the ranges, loads and decodes the
/// image, and classifies it on a blocking worker. Nothing is shared between
/// calls except the optional image cache.
#[derive(Clone)]
pub struct ImageAnalyzer {
    config: AnalysisConfig,
    loader: ImageLoader,
}

impl ImageAnalyzer {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let loader = ImageLoader::new(Duration::from_secs(config.http_timeout_secs))?;
        Ok(Self { config, loader })
    }

    /// Analyzer whose loader memoizes fetched images in `cache`.
    pub fn with_cache(config: AnalysisConfig, cache: Arc<ImageCache>) -> AnalysisResult<Self> {
        let mut analyzer = Self::new(config)?;
        analyzer.loader = analyzer.loader.with_cache(cache);
        Ok(analyzer)
    }

    /// Classify against `ranges` only; never falls back to clustering.
    pub async fn analyze_image_by_color(
        &self,
        src: &str,
        ranges: &[ColorRange],
    ) -> AnalysisResult<AnalysisOutcome> {
        self.analyze(src, ranges, AnalysisMode::Basic).await
    }

    /// Classify against `ranges`, falling back to dynamic clustering when
    /// the match rate is below the configured threshold.
    pub async fn analyze_image_by_color_advanced(
        &self,
        src: &str,
        ranges: &[ColorRange],
    ) -> AnalysisResult<AnalysisOutcome> {
        self.analyze(src, ranges, AnalysisMode::Advanced).await
    }

    #[instrument(skip(self, src, ranges), fields(mode = ?mode, ranges = ranges.len()))]
    pub async fn analyze(
        &self,
        src: &str,
        ranges: &[ColorRange],
        mode: AnalysisMode,
    ) -> AnalysisResult<AnalysisOutcome> {
        let result = self.run(src, ranges, mode).await;
        if let Err(e) = &result {
            warn!(stage = %AnalysisStage::Rejected, kind = e.kind(), error = %e, "Color analysis rejected");
        }
        result
    }

    async fn run(
        &self,
        src: &str,
        ranges: &[ColorRange],
        mode: AnalysisMode,
    ) -> AnalysisResult<AnalysisOutcome> {
        debug!(stage = %AnalysisStage::Idle, "Validating color ranges");
        let definitions = validate_ranges(ranges)?;
        let source = ImageSource::parse(src)?;

        debug!(stage = %AnalysisStage::Decoding, source = %source, "Loading image");
        let start = Instant::now();
        let bytes = self.loader.load(&source).await?;

        let config = self.config.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let raster = decode_raster(&bytes)?;
            analyze_raster(&raster, &definitions, mode, &config)
        })
        .await
        .map_err(|e| AnalysisError::processing(format!("analysis task failed: {}", e)))??;

        info!(
            source = %source,
            analysis_type = %outcome.analysis_type,
            total_pixels = outcome.total_pixels,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Image analyzed"
        );

        Ok(outcome)
    }
}
