//! Resolving which color ranges an analysis runs against.

use agro_common::{AnalysisError, AnalysisResult, ColorRange, Palette, PaletteConfig};
use std::path::Path;
use tracing::debug;

/// Where the color ranges come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSource<'a> {
    /// A JSON array of ranges in a file.
    File(&'a Path),
    /// A palette key, looked up in `palette_file` when given, else built in.
    Palette {
        key: &'a str,
        palette_file: Option<&'a Path>,
    },
}

pub fn resolve_ranges(source: RangeSource<'_>) -> AnalysisResult<Vec<ColorRange>> {
    match source {
        RangeSource::File(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                AnalysisError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            let ranges: Vec<ColorRange> = serde_json::from_str(&content)?;
            debug!(path = %path.display(), count = ranges.len(), "Loaded color ranges");
            Ok(ranges)
        }
        RangeSource::Palette {
            key,
            palette_file: Some(path),
        } => {
            let config = PaletteConfig::from_file(path)?;
            config.validate()?;
            let palette = config.get(key).ok_or_else(|| {
                AnalysisError::Config(format!("palette '{}' not found in {}", key, path.display()))
            })?;
            debug!(palette = %palette.name, count = palette.ranges.len(), "Using palette from file");
            Ok(palette.ranges.clone())
        }
        RangeSource::Palette {
            key,
            palette_file: None,
        } => {
            let palette = Palette::builtin(key).ok_or_else(|| {
                AnalysisError::Config(format!(
                    "unknown palette '{}', expected one of: {}",
                    key,
                    Palette::builtin_keys().join(", ")
                ))
            })?;
            Ok(palette.ranges)
        }
    }
}
