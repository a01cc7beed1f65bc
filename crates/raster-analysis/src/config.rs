//! Configuration for raster analysis.

use agro_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Tunables for the classification pipeline and image loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Pixels with alpha below this are skipped entirely.
    pub alpha_threshold: u8,

    /// Predefined match rate (percent) below which the dynamic path runs.
    pub fallback_threshold_percent: u8,

    /// Grid size used to merge near-identical colors into one cluster.
    pub quantize_step: u8,

    /// Maximum number of dynamic clusters reported.
    pub max_clusters: usize,

    /// Minimum share (percent of analyzed pixels) for a cluster to be kept.
    pub min_cluster_share_percent: u8,

    /// Timeout for fetching remote images.
    pub http_timeout_secs: u64,

    /// Memory budget for the image byte cache in megabytes.
    pub image_cache_size_mb: usize,

    /// Lifetime of cached image bytes.
    pub image_cache_ttl_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 128,
            fallback_threshold_percent: 30,
            quantize_step: 15,
            max_clusters: 8,
            min_cluster_share_percent: 1,
            http_timeout_secs: 30,
            image_cache_size_mb: 64,
            image_cache_ttl_secs: 600,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse("ANALYSIS_ALPHA_THRESHOLD") {
            config.alpha_threshold = v;
        }
        if let Some(v) = env_parse("ANALYSIS_FALLBACK_THRESHOLD") {
            config.fallback_threshold_percent = v;
        }
        if let Some(v) = env_parse("ANALYSIS_QUANTIZE_STEP") {
            config.quantize_step = v;
        }
        if let Some(v) = env_parse("ANALYSIS_MAX_CLUSTERS") {
            config.max_clusters = v;
        }
        if let Some(v) = env_parse("ANALYSIS_MIN_CLUSTER_SHARE") {
            config.min_cluster_share_percent = v;
        }
        if let Some(v) = env_parse("IMAGE_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = v;
        }
        if let Some(v) = env_parse("IMAGE_CACHE_SIZE_MB") {
            config.image_cache_size_mb = v;
        }
        if let Some(v) = env_parse("IMAGE_CACHE_TTL_SECS") {
            config.image_cache_ttl_secs = v;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.quantize_step == 0 {
            return Err(AnalysisError::Config("quantize_step must be > 0".to_string()));
        }
        if self.max_clusters == 0 {
            return Err(AnalysisError::Config("max_clusters must be > 0".to_string()));
        }
        if self.fallback_threshold_percent > 100 {
            return Err(AnalysisError::Config(
                "fallback_threshold_percent must be 0-100".to_string(),
            ));
        }
        if self.min_cluster_share_percent > 100 {
            return Err(AnalysisError::Config(
                "min_cluster_share_percent must be 0-100".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.alpha_threshold, 128);
        assert_eq!(config.fallback_threshold_percent, 30);
        assert_eq!(config.quantize_step, 15);
        assert_eq!(config.max_clusters, 8);
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = AnalysisConfig {
            quantize_step: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let config = AnalysisConfig {
            max_clusters: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_over_100() {
        let config = AnalysisConfig {
            fallback_threshold_percent: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
