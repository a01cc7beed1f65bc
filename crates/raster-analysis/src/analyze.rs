//! Synchronous raster-to-legend pipeline.
//!
//! ```text
//! Idle → Decoding → Sampling → Classifying ─┬─────────────→ Aggregating → Resolved
//!                                           └→ Clustering ─┘
//! (any stage) → Rejected
//! ```
//!
//! Decoding happens in `source`; this module starts from a decoded raster.

use agro_common::{AnalysisResult, ColorDefinition};
use chrono::Utc;
use tracing::{debug, info};

use crate::aggregate::{aggregate_clusters, aggregate_predefined, round_tenth};
use crate::classifier::Classifier;
use crate::cluster::ColorClusterer;
use crate::config::AnalysisConfig;
use crate::outcome::{AnalysisMetadata, AnalysisOutcome, AnalysisType};
use crate::raster::DecodedRaster;

/// Pipeline stage, reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Idle,
    Decoding,
    Sampling,
    Classifying,
    Clustering,
    Aggregating,
    Resolved,
    Rejected,
}

impl AnalysisStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::Idle => "idle",
            AnalysisStage::Decoding => "decoding",
            AnalysisStage::Sampling => "sampling",
            AnalysisStage::Classifying => "classifying",
            AnalysisStage::Clustering => "clustering",
            AnalysisStage::Aggregating => "aggregating",
            AnalysisStage::Resolved => "resolved",
            AnalysisStage::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a poor predefined match may fall back to dynamic clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Predefined buckets only.
    Basic,
    /// Predefined buckets, falling back to clustering on a low match rate.
    #[default]
    Advanced,
}

/// Classify a decoded raster against `definitions`.
///
/// Pixels below the alpha threshold are ignored. In `Advanced` mode a match
/// rate under `config.fallback_threshold_percent` discards the predefined
/// counts and reports dynamic clusters instead.
pub fn analyze_raster(
    raster: &DecodedRaster,
    definitions: &[ColorDefinition],
    mode: AnalysisMode,
    config: &AnalysisConfig,
) -> AnalysisResult<AnalysisOutcome> {
    config.validate()?;

    debug!(
        stage = %AnalysisStage::Sampling,
        width = raster.width(),
        height = raster.height(),
        "Sampling raster"
    );
    let samples = raster.samples(config.alpha_threshold);

    debug!(stage = %AnalysisStage::Classifying, buckets = definitions.len(), "Classifying pixels");
    let tally = Classifier::new(definitions).run(samples);
    let match_percentage = round_tenth(tally.match_percentage());

    let fall_back =
        mode == AnalysisMode::Advanced && tally.below_threshold(config.fallback_threshold_percent);

    let (analysis_type, results) = if fall_back {
        info!(
            match_percentage,
            threshold = config.fallback_threshold_percent,
            "Predefined colors matched poorly, switching to dynamic clustering"
        );
        debug!(stage = %AnalysisStage::Clustering, "Clustering pixels");
        let clusterer = ColorClusterer::new(
            config.quantize_step,
            config.max_clusters,
            config.min_cluster_share_percent,
        );
        let summary = clusterer.cluster(raster.samples(config.alpha_threshold));

        debug!(stage = %AnalysisStage::Aggregating, clusters = summary.clusters.len(), "Aggregating");
        (
            AnalysisType::Dynamic,
            aggregate_clusters(&summary, raster.pixel_count()),
        )
    } else {
        debug!(stage = %AnalysisStage::Aggregating, "Aggregating");
        (
            AnalysisType::Predefined,
            aggregate_predefined(definitions, &tally, raster.pixel_count()),
        )
    };

    info!(
        stage = %AnalysisStage::Resolved,
        analysis_type = %analysis_type,
        total_pixels = tally.analyzed,
        matched = tally.matched,
        results = results.len(),
        "Color analysis complete"
    );

    Ok(AnalysisOutcome {
        success: true,
        total_pixels: tally.analyzed,
        results,
        analysis_type,
        metadata: AnalysisMetadata {
            image_width: raster.width(),
            image_height: raster.height(),
            match_percentage,
            analysis_date: Utc::now(),
        },
    })
}
