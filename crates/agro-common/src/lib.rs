//! Common types shared across the parcel imagery workspace.

pub mod color;
pub mod error;
pub mod palette;

pub use color::{validate_ranges, ColorDefinition, ColorRange, Rgb, DEFAULT_TOLERANCE};
pub use error::{AnalysisError, AnalysisFailure, AnalysisResult};
pub use palette::{Palette, PaletteConfig};
