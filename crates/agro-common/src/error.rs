//! Error types for raster color analysis.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using AnalysisError.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Primary error type for analysis operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // === Input Errors ===
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Malformed raster: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    MalformedRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid color definition at index {index} ('{name}'): {reason}")]
    InvalidColorDefinition {
        index: usize,
        name: String,
        reason: String,
    },

    // === Runtime Errors ===
    #[error("Analysis failed: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Create an ImageLoad error.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Create an InvalidColorDefinition error.
    pub fn invalid_definition(
        index: usize,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidColorDefinition {
            index,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Processing error.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ImageLoad(_) => "image_load",
            AnalysisError::MalformedRaster { .. } => "malformed_raster",
            AnalysisError::InvalidColorDefinition { .. } => "invalid_color_definition",
            AnalysisError::Processing(_) => "processing",
            AnalysisError::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Config(format!("JSON error: {}", err))
    }
}

/// Rejected outcome handed back to callers: `{ success: false, error }`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisFailure {
    pub success: bool,
    pub error: String,
    pub kind: String,
}

impl From<&AnalysisError> for AnalysisFailure {
    fn from(err: &AnalysisError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

impl From<AnalysisError> for AnalysisFailure {
    fn from(err: AnalysisError) -> Self {
        Self::from(&err)
    }
}
