//! Turns bucket counts into legend entries with percentages.

use agro_common::{ColorDefinition, Rgb};
use serde::{Deserialize, Serialize};

use crate::classifier::ClassificationTally;
use crate::cluster::{agricultural_label, assign_unique_labels, ClusterSummary};

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub name: String,
    pub count: u64,
    /// Share of the denominator pixels, 0-100, one decimal. Serialized as a
    /// JSON number (`50.0`); use `percent_label` for the fixed "50.0" text.
    pub percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Rgb>,
    /// CSS color string for legend swatches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ClassificationResult {
    /// Percent formatted the way legends print it ("50.0").
    pub fn percent_label(&self) -> String {
        format!("{:.1}", self.percent)
    }
}

/// Round to one decimal place.
#[inline]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `count / denominator` as a percentage rounded to one decimal; 0 when the
/// denominator is 0.
pub fn percent_of(count: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_tenth(count as f64 / denominator as f64 * 100.0)
}

/// Analyzed pixels when there are any, otherwise the raster's pixel count.
pub fn denominator(analyzed: u64, total: u64) -> u64 {
    if analyzed > 0 {
        analyzed
    } else {
        total
    }
}

/// One result per definition, in definition order.
pub fn aggregate_predefined(
    definitions: &[ColorDefinition],
    tally: &ClassificationTally,
    total: u64,
) -> Vec<ClassificationResult> {
    let denom = denominator(tally.analyzed, total);

    definitions
        .iter()
        .zip(&tally.counts)
        .map(|(def, &count)| ClassificationResult {
            name: def.name.clone(),
            count,
            percent: percent_of(count, denom),
            rgb: Some(def.rgb),
            color: Some(def.rgb.css()),
        })
        .collect()
}

/// One result per retained cluster, labelled and de-duplicated.
pub fn aggregate_clusters(summary: &ClusterSummary, total: u64) -> Vec<ClassificationResult> {
    let denom = denominator(summary.analyzed, total);
    let labels = assign_unique_labels(
        summary
            .clusters
            .iter()
            .map(|c| agricultural_label(c.representative)),
    );

    summary
        .clusters
        .iter()
        .zip(labels)
        .map(|(cluster, name)| ClassificationResult {
            name,
            count: cluster.count,
            percent: percent_of(cluster.count, denom),
            rgb: Some(cluster.representative),
            color: Some(cluster.representative.css()),
        })
        .collect()
}
