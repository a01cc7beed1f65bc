//! Dynamic color clustering for imagery whose palette is unknown.
//!
//! When the predefined buckets explain too little of an image, the pixels are
//! summarised instead: every color is snapped to a coarse grid, grid cells are
//! ranked by frequency, and the most common cells get agricultural labels
//! derived from their average color.

use agro_common::Rgb;
use std::collections::{HashMap, HashSet};

use crate::raster::PixelSample;

/// One retained color cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCluster {
    /// Quantized grid cell the cluster was keyed on.
    pub key: Rgb,
    /// Mean of the unquantized member pixels.
    pub representative: Rgb,
    pub count: u64,
}

/// Result of a clustering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    /// Retained clusters, most frequent first.
    pub clusters: Vec<ColorCluster>,
    /// Opaque pixels seen.
    pub analyzed: u64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

/// Snap a channel value down to a multiple of `step`.
#[inline]
pub fn quantize(value: u8, step: u8) -> u8 {
    if step <= 1 {
        return value;
    }
    (value / step) * step
}

/// Frequency-ranked color clustering on a quantized RGB grid.
#[derive(Debug, Clone)]
pub struct ColorClusterer {
    pub step: u8,
    pub max_clusters: usize,
    pub min_share_percent: u8,
}

impl Default for ColorClusterer {
    fn default() -> Self {
        Self {
            step: 15,
            max_clusters: 8,
            min_share_percent: 1,
        }
    }
}

impl ColorClusterer {
    pub fn new(step: u8, max_clusters: usize, min_share_percent: u8) -> Self {
        Self {
            step,
            max_clusters,
            min_share_percent,
        }
    }

    /// Tally, rank, filter and cap clusters over `samples`.
    pub fn cluster<I>(&self, samples: I) -> ClusterSummary
    where
        I: IntoIterator<Item = PixelSample>,
    {
        let mut cells: HashMap<Rgb, Accumulator> = HashMap::new();
        let mut analyzed = 0u64;

        for px in samples {
            analyzed += 1;
            let key = Rgb::new(
                quantize(px.r, self.step),
                quantize(px.g, self.step),
                quantize(px.b, self.step),
            );
            let acc = cells.entry(key).or_default();
            acc.count += 1;
            acc.r += px.r as u64;
            acc.g += px.g as u64;
            acc.b += px.b as u64;
        }

        let mut ranked: Vec<(Rgb, Accumulator)> = cells.into_iter().collect();
        // Ties broken by key so the output does not depend on hash order.
        ranked.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then(ka.cmp(kb)));

        let min_share = self.min_share_percent as u128;
        let clusters = ranked
            .into_iter()
            .filter(|(_, acc)| (acc.count as u128) * 100 >= (analyzed as u128) * min_share)
            .take(self.max_clusters)
            .map(|(key, acc)| ColorCluster {
                key,
                representative: Rgb::new(
                    (acc.r / acc.count) as u8,
                    (acc.g / acc.count) as u8,
                    (acc.b / acc.count) as u8,
                ),
                count: acc.count,
            })
            .collect();

        ClusterSummary { clusters, analyzed }
    }
}

/// Human-readable agricultural label for a color.
///
/// Looks at each channel's share of `r + g + b` to decide which family the
/// color belongs to (vegetation, dryness, transition, moisture), then at the
/// dominant channel's magnitude to grade it. Colors with no dominant channel
/// are named by brightness.
pub fn agricultural_label(rgb: Rgb) -> &'static str {
    let sum = rgb.channel_sum();
    if sum == 0 {
        return "No Data";
    }

    let total = sum as f32;
    let red = rgb.r as f32 / total;
    let green = rgb.g as f32 / total;
    let blue = rgb.b as f32 / total;
    let brightness = total / 3.0;

    if green > 0.4 && rgb.g > rgb.r && rgb.g > rgb.b {
        return match rgb.g {
            g if g >= 180 => "Very Dense Vegetation",
            g if g >= 130 => "Dense Vegetation",
            g if g >= 80 => "Moderate Vegetation",
            _ => "Sparse Vegetation",
        };
    }

    if red > 0.4 && rgb.r > rgb.g && rgb.r > rgb.b {
        return match rgb.r {
            r if r >= 200 => "Severe Dryness",
            r if r >= 140 => "Dry Soil",
            _ => "Bare Soil",
        };
    }

    if red > 0.33 && green > 0.33 && blue < 0.25 {
        return if brightness >= 150.0 {
            "Low Vegetation"
        } else {
            "Transition Zone"
        };
    }

    if blue > 0.4 && rgb.b > rgb.r && rgb.b > rgb.g {
        return match rgb.b {
            b if b >= 180 => "Water Body",
            b if b >= 120 => "High Moisture",
            _ => "Moderate Moisture",
        };
    }

    match brightness {
        v if v >= 220.0 => "Cloud Cover",
        v if v >= 150.0 => "Bright Area",
        v if v >= 80.0 => "Neutral Area",
        v if v >= 30.0 => "Shaded Area",
        _ => "Dark Area",
    }
}

/// Make labels unique in order of appearance: a repeated label becomes
/// "Label 2", "Label 3", and so on.
pub fn assign_unique_labels<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (labels, _) = candidates.into_iter().fold(
        (Vec::new(), HashSet::new()),
        |(mut labels, mut used): (Vec<String>, HashSet<String>), candidate| {
            let base = candidate.as_ref();
            let mut label = base.to_string();
            let mut suffix = 2;
            while used.contains(&label) {
                label = format!("{} {}", base, suffix);
                suffix += 1;
            }
            used.insert(label.clone());
            labels.push(label);
            (labels, used)
        },
    );
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(r: u8, g: u8, b: u8) -> PixelSample {
        PixelSample::new(r, g, b, 255)
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0, 15), 0);
        assert_eq!(quantize(14, 15), 0);
        assert_eq!(quantize(15, 15), 15);
        assert_eq!(quantize(254, 15), 240);
        assert_eq!(quantize(255, 15), 255);
        assert_eq!(quantize(77, 1), 77);
    }

    #[test]
    fn test_near_colors_merge() {
        let summary = ColorClusterer::default().cluster(vec![px(31, 61, 91), px(44, 74, 104)]);

        assert_eq!(summary.clusters.len(), 1);
        let cluster = &summary.clusters[0];
        assert_eq!(cluster.key, Rgb::new(30, 60, 90));
        assert_eq!(cluster.count, 2);
        assert_eq!(cluster.representative, Rgb::new(37, 67, 97));
    }

    #[test]
    fn test_ranked_by_frequency_then_key() {
        let mut samples = vec![px(200, 0, 0); 5];
        samples.extend(vec![px(0, 0, 200); 3]);
        samples.extend(vec![px(0, 200, 0); 3]);

        let summary = ColorClusterer::default().cluster(samples);
        let keys: Vec<Rgb> = summary.clusters.iter().map(|c| c.key).collect();

        assert_eq!(
            keys,
            vec![Rgb::new(195, 0, 0), Rgb::new(0, 0, 195), Rgb::new(0, 195, 0)]
        );
    }

    #[test]
    fn test_minimum_share_filter() {
        // 1 pixel in 200 is 0.5%, below the 1% cut
        let mut samples = vec![px(100, 100, 100); 199];
        samples.push(px(250, 0, 0));

        let summary = ColorClusterer::default().cluster(samples);
        assert_eq!(summary.analyzed, 200);
        assert_eq!(summary.clusters.len(), 1);

        // 1 pixel in 100 is exactly 1%, kept
        let mut samples = vec![px(100, 100, 100); 99];
        samples.push(px(250, 0, 0));
        assert_eq!(ColorClusterer::default().cluster(samples).clusters.len(), 2);
    }

    #[test]
    fn test_cluster_cap() {
        let samples: Vec<_> = (0..12u8).map(|i| px(i * 20, 0, 0)).collect();
        let summary = ColorClusterer::new(15, 8, 1).cluster(samples);
        assert_eq!(summary.clusters.len(), 8);
    }

    #[test]
    fn test_empty_input() {
        let summary = ColorClusterer::default().cluster(Vec::new());
        assert_eq!(summary.analyzed, 0);
        assert!(summary.clusters.is_empty());
    }

    #[test]
    fn test_vegetation_labels() {
        assert_eq!(agricultural_label(Rgb::new(26, 200, 80)), "Very Dense Vegetation");
        assert_eq!(agricultural_label(Rgb::new(46, 150, 50)), "Dense Vegetation");
        assert_eq!(agricultural_label(Rgb::new(46, 125, 50)), "Moderate Vegetation");
        assert_eq!(agricultural_label(Rgb::new(20, 60, 20)), "Sparse Vegetation");
    }

    #[test]
    fn test_dryness_labels() {
        assert_eq!(agricultural_label(Rgb::new(215, 48, 39)), "Severe Dryness");
        assert_eq!(agricultural_label(Rgb::new(160, 60, 40)), "Dry Soil");
        assert_eq!(agricultural_label(Rgb::new(100, 40, 30)), "Bare Soil");
    }

    #[test]
    fn test_transition_and_moisture_labels() {
        assert_eq!(agricultural_label(Rgb::new(200, 200, 60)), "Low Vegetation");
        assert_eq!(agricultural_label(Rgb::new(110, 110, 40)), "Transition Zone");
        assert_eq!(agricultural_label(Rgb::new(20, 60, 200)), "Water Body");
        assert_eq!(agricultural_label(Rgb::new(30, 70, 140)), "High Moisture");
        assert_eq!(agricultural_label(Rgb::new(20, 40, 90)), "Moderate Moisture");
    }

    #[test]
    fn test_neutral_labels() {
        assert_eq!(agricultural_label(Rgb::new(0, 0, 0)), "No Data");
        assert_eq!(agricultural_label(Rgb::new(250, 250, 250)), "Cloud Cover");
        assert_eq!(agricultural_label(Rgb::new(180, 180, 180)), "Bright Area");
        assert_eq!(agricultural_label(Rgb::new(128, 128, 128)), "Neutral Area");
        assert_eq!(agricultural_label(Rgb::new(50, 50, 50)), "Shaded Area");
        assert_eq!(agricultural_label(Rgb::new(10, 10, 10)), "Dark Area");
    }

    #[test]
    fn test_assign_unique_labels() {
        let labels = assign_unique_labels(vec![
            "Dense Vegetation",
            "Bare Soil",
            "Dense Vegetation",
            "Dense Vegetation",
            "Bare Soil",
        ]);

        assert_eq!(
            labels,
            vec![
                "Dense Vegetation",
                "Bare Soil",
                "Dense Vegetation 2",
                "Dense Vegetation 3",
                "Bare Soil 2",
            ]
        );
    }

    #[test]
    fn test_assign_unique_labels_skips_taken_suffix() {
        let labels = assign_unique_labels(vec!["Area 2", "Area", "Area"]);
        assert_eq!(labels, vec!["Area 2", "Area", "Area 3"]);
    }
}
