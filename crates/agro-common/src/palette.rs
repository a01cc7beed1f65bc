//! Named palettes of color ranges.
//!
//! A palette is the predefined bucket list for one index raster (NDVI, NDMI,
//! ...). Palettes can be loaded from a JSON file:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "palettes": {
//!     "ndvi": {
//!       "name": "NDVI",
//!       "ranges": [{ "name": "Dense Vegetation", "rgb": [26, 152, 80], "tolerance": 40 }]
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::color::{validate_ranges, ColorDefinition, ColorRange};
use crate::error::{AnalysisError, AnalysisResult};

/// Root palette configuration - can contain multiple named palettes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_version")]
    pub version: String,

    pub palettes: HashMap<String, Palette>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl PaletteConfig {
    /// Load palette configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse palette configuration from JSON string.
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get a palette by key.
    pub fn get(&self, key: &str) -> Option<&Palette> {
        self.palettes.get(key)
    }

    /// Validate all palettes in the configuration.
    pub fn validate(&self) -> AnalysisResult<()> {
        for (key, palette) in &self.palettes {
            palette
                .definitions()
                .map_err(|e| AnalysisError::Config(format!("{}: {}", key, e)))?;
        }
        Ok(())
    }
}

/// An ordered list of color ranges for one kind of imagery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub ranges: Vec<ColorRange>,
}

impl Palette {
    /// Built-in palettes for the vegetation and moisture index layers.
    pub fn builtin(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "ndvi" => Some(Self::ndvi()),
            "ndmi" => Some(Self::ndmi()),
            _ => None,
        }
    }

    /// Keys accepted by `builtin`.
    pub fn builtin_keys() -> &'static [&'static str] {
        &["ndvi", "ndmi"]
    }

    /// Vegetation index ramp, red (bare) to dark green (dense canopy).
    pub fn ndvi() -> Self {
        Self {
            name: "NDVI".to_string(),
            description: "Normalized difference vegetation index".to_string(),
            ranges: vec![
                ColorRange::new("Bare Soil", [215, 48, 39], 40),
                ColorRange::new("Sparse Vegetation", [252, 141, 89], 40),
                ColorRange::new("Low Vegetation", [254, 224, 139], 40),
                ColorRange::new("Moderate Vegetation", [217, 239, 139], 40),
                ColorRange::new("Dense Vegetation", [145, 207, 96], 40),
                ColorRange::new("Very Dense Vegetation", [26, 152, 80], 40),
            ],
        }
    }

    /// Moisture index ramp, brown (water stress) to teal (saturated).
    pub fn ndmi() -> Self {
        Self {
            name: "NDMI".to_string(),
            description: "Normalized difference moisture index".to_string(),
            ranges: vec![
                ColorRange::new("Severe Water Stress", [140, 81, 10], 40),
                ColorRange::new("Water Stress", [216, 179, 101], 40),
                ColorRange::new("Low Moisture", [246, 232, 195], 30),
                ColorRange::new("Adequate Moisture", [199, 234, 229], 30),
                ColorRange::new("High Moisture", [90, 180, 172], 40),
                ColorRange::new("Waterlogged", [1, 102, 94], 40),
            ],
        }
    }

    /// Validated definitions, in palette order.
    pub fn definitions(&self) -> AnalysisResult<Vec<ColorDefinition>> {
        validate_ranges(&self.ranges)
    }
}
