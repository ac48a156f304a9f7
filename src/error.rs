//! Error types for the covering pipeline.

use thiserror::Error;

/// Covering pipeline errors.
#[derive(Error, Debug)]
pub enum CoverError {
    /// Ring has fewer than 3 distinct points after closing-point removal.
    #[error("Degenerate ring: {distinct} distinct points, need at least 3")]
    DegenerateRing { distinct: usize },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Marker table row could not be parsed.
    #[error("Invalid marker on row {row}: {reason}")]
    InvalidMarker { row: usize, reason: String },

    /// Feature collection entry could not be interpreted.
    #[error("Invalid feature #{index}: {reason}")]
    InvalidFeature { index: usize, reason: String },

    /// IO error while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON parse error.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Config file parse error.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CoverError {
    /// Whether this error must abort the whole run.
    ///
    /// Only ring degeneracy can be downgraded to a per-feature skip; every
    /// input, output and configuration failure is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoverError::DegenerateRing { .. })
    }
}

/// Result type for covering operations.
pub type Result<T> = std::result::Result<T, CoverError>;
