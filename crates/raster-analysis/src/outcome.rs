//! The resolved result of one analysis call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::ClassificationResult;

/// Which classification path produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Predefined,
    Dynamic,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Predefined => "predefined",
            AnalysisType::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub image_width: u32,
    pub image_height: u32,
    /// Share of analyzed pixels matched by the predefined buckets, one decimal.
    pub match_percentage: f64,
    pub analysis_date: DateTime<Utc>,
}

/// Successful analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub success: bool,
    /// Opaque (analyzed) pixel count.
    pub total_pixels: u64,
    pub results: Vec<ClassificationResult>,
    pub analysis_type: AnalysisType,
    pub metadata: AnalysisMetadata,
}

impl AnalysisOutcome {
    /// Pixels accounted for by some result. Never exceeds `total_pixels`.
    pub fn matched_pixels(&self) -> u64 {
        self.results.iter().map(|r| r.count).sum()
    }

    /// Sum of result percentages.
    pub fn percent_total(&self) -> f64 {
        self.results.iter().map(|r| r.percent).sum()
    }

    /// Look up a result by name.
    pub fn result(&self, name: &str) -> Option<&ClassificationResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_json_shape() {
        let outcome = AnalysisOutcome {
            success: true,
            total_pixels: 4,
            results: vec![ClassificationResult {
                name: "Veg".to_string(),
                count: 4,
                percent: 100.0,
                rgb: None,
                color: None,
            }],
            analysis_type: AnalysisType::Predefined,
            metadata: AnalysisMetadata {
                image_width: 2,
                image_height: 2,
                match_percentage: 100.0,
                analysis_date: Utc::now(),
            },
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["totalPixels"], 4);
        assert_eq!(json["analysisType"], "predefined");
        assert_eq!(json["metadata"]["imageWidth"], 2);
        assert!(json["metadata"]["analysisDate"].is_string());
        assert!(json["results"][0].get("rgb").is_none());
        assert_eq!(outcome.matched_pixels(), 4);
    }
}
