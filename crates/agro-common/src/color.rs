//! Color ranges supplied by callers and their validated form.
//!
//! Callers hand in an ordered list of `{ name, rgb: [r, g, b], tolerance }`
//! entries. The wire shape (`ColorRange`) is lenient so that a missing or
//! malformed triple surfaces as `InvalidColorDefinition` instead of a generic
//! parse failure; `validate_ranges` turns it into `ColorDefinition`s.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AnalysisError, AnalysisResult};

/// Tolerance used when a range omits one.
pub const DEFAULT_TOLERANCE: u8 = 30;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex string: "#RRGGBB".
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS functional notation: "rgb(r, g, b)".
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn channel_sum(&self) -> u16 {
        self.r as u16 + self.g as u16 + self.b as u16
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A named color bucket as it arrives from a caller or a palette file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub name: String,

    /// RGB triple; kept wide so out-of-range values can be reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<i64>,
}

impl ColorRange {
    pub fn new(name: impl Into<String>, rgb: [u8; 3], tolerance: u8) -> Self {
        Self {
            name: name.into(),
            rgb: Some(rgb.iter().map(|&c| c as i64).collect()),
            tolerance: Some(tolerance as i64),
        }
    }

    /// Validate this entry, reporting problems against its position in the list.
    pub fn validate(&self, index: usize) -> AnalysisResult<ColorDefinition> {
        // Names are reported back exactly as supplied; blank ones are rejected.
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(AnalysisError::invalid_definition(index, name, "name is empty"));
        }

        let triple = self
            .rgb
            .as_ref()
            .ok_or_else(|| AnalysisError::invalid_definition(index, name, "missing rgb triple"))?;

        if triple.len() != 3 {
            return Err(AnalysisError::invalid_definition(
                index,
                name,
                format!("rgb must have 3 channels, got {}", triple.len()),
            ));
        }

        let mut channels = [0u8; 3];
        for (slot, &value) in channels.iter_mut().zip(triple) {
            *slot = u8::try_from(value).map_err(|_| {
                AnalysisError::invalid_definition(
                    index,
                    name,
                    format!("rgb channel {} is outside 0-255", value),
                )
            })?;
        }

        let tolerance = match self.tolerance {
            None => DEFAULT_TOLERANCE,
            Some(t) => u8::try_from(t).map_err(|_| {
                AnalysisError::invalid_definition(
                    index,
                    name,
                    format!("tolerance {} is outside 0-255", t),
                )
            })?,
        };

        Ok(ColorDefinition {
            name: self.name.clone(),
            rgb: Rgb::new(channels[0], channels[1], channels[2]),
            tolerance,
        })
    }
}

/// A validated color bucket. Order within a list is significant: the first
/// matching definition wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDefinition {
    pub name: String,
    pub rgb: Rgb,
    pub tolerance: u8,
}

impl ColorDefinition {
    pub fn new(name: impl Into<String>, rgb: Rgb, tolerance: u8) -> Self {
        Self {
            name: name.into(),
            rgb,
            tolerance,
        }
    }

    /// Per-channel tolerance test. The match region is a cube around `rgb`,
    /// not a sphere.
    #[inline]
    pub fn matches(&self, r: u8, g: u8, b: u8) -> bool {
        r.abs_diff(self.rgb.r) <= self.tolerance
            && g.abs_diff(self.rgb.g) <= self.tolerance
            && b.abs_diff(self.rgb.b) <= self.tolerance
    }
}

/// Validate an ordered list of ranges. Fails on the first bad entry; names
/// must be unique within the list, ignoring surrounding whitespace.
pub fn validate_ranges(ranges: &[ColorRange]) -> AnalysisResult<Vec<ColorDefinition>> {
    let mut seen = HashSet::with_capacity(ranges.len());
    let mut definitions = Vec::with_capacity(ranges.len());

    for (index, range) in ranges.iter().enumerate() {
        let definition = range.validate(index)?;
        if !seen.insert(definition.name.trim().to_string()) {
            return Err(AnalysisError::invalid_definition(
                index,
                &definition.name,
                "duplicate name",
            ));
        }
        definitions.push(definition);
    }

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(46, 125, 50).hex(), "#2E7D32");
        assert_eq!(Rgb::new(1, 2, 255).hex(), "#0102FF");
    }

    #[test]
    fn test_css() {
        assert_eq!(Rgb::new(1, 2, 3).css(), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_matches_is_per_channel() {
        let def = ColorDefinition::new("Veg", Rgb::new(100, 100, 100), 10);

        assert!(def.matches(110, 90, 110));
        assert!(!def.matches(111, 100, 100));
        assert!(!def.matches(100, 89, 100));
        // Euclidean distance here is ~17.3, still a match per channel
        assert!(def.matches(110, 110, 110));
    }

    #[test]
    fn test_matches_near_channel_limits() {
        let def = ColorDefinition::new("White", Rgb::new(250, 250, 250), 10);
        assert!(def.matches(255, 255, 255));
        assert!(def.matches(240, 240, 240));
        assert!(!def.matches(239, 255, 255));
    }

    #[test]
    fn test_validate_missing_rgb() {
        let range: ColorRange = serde_json::from_str(r#"{"name": "Veg", "tolerance": 10}"#).unwrap();
        let err = range.validate(2).unwrap_err();

        match err {
            AnalysisError::InvalidColorDefinition { index, name, reason } => {
                assert_eq!(index, 2);
                assert_eq!(name, "Veg");
                assert!(reason.contains("missing rgb"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_wrong_length_and_range() {
        let short: ColorRange = serde_json::from_str(r#"{"name": "A", "rgb": [1, 2]}"#).unwrap();
        assert!(short.validate(0).is_err());

        let wide: ColorRange = serde_json::from_str(r#"{"name": "B", "rgb": [1, 2, 256]}"#).unwrap();
        assert!(wide.validate(0).is_err());

        let negative: ColorRange =
            serde_json::from_str(r#"{"name": "C", "rgb": [1, 2, 3], "tolerance": -1}"#).unwrap();
        assert!(negative.validate(0).is_err());
    }

    #[test]
    fn test_validate_default_tolerance() {
        let range: ColorRange = serde_json::from_str(r#"{"name": "Soil", "rgb": [120, 80, 40]}"#).unwrap();
        let def = range.validate(0).unwrap();

        assert_eq!(def.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(def.rgb, Rgb::new(120, 80, 40));
    }

    #[test]
    fn test_validate_ranges_rejects_duplicates() {
        let ranges = vec![
            ColorRange::new("Veg", [0, 128, 0], 10),
            ColorRange::new("Soil", [120, 80, 40], 10),
            ColorRange::new("Veg", [0, 200, 0], 10),
        ];

        let err = validate_ranges(&ranges).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidColorDefinition { index: 2, .. }
        ));
    }

    #[test]
    fn test_validate_ranges_preserves_order() {
        let ranges = vec![
            ColorRange::new("First", [0, 0, 0], 0),
            ColorRange::new("Second", [255, 255, 255], 0),
        ];

        let defs = validate_ranges(&ranges).unwrap();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_validate_empty_name() {
        let ranges = vec![ColorRange::new("  ", [0, 0, 0], 0)];
        assert!(validate_ranges(&ranges).is_err());
    }

    #[test]
    fn test_validate_keeps_supplied_name() {
        let ranges = vec![ColorRange::new(" Veg ", [46, 125, 50], 10)];
        let defs = validate_ranges(&ranges).unwrap();
        assert_eq!(defs[0].name, " Veg ");
    }

    #[test]
    fn test_duplicates_ignore_surrounding_whitespace() {
        let ranges = vec![
            ColorRange::new("Veg", [0, 128, 0], 10),
            ColorRange::new("Veg ", [0, 200, 0], 10),
        ];
        assert!(matches!(
            validate_ranges(&ranges).unwrap_err(),
            AnalysisError::InvalidColorDefinition { index: 1, .. }
        ));
    }
}
