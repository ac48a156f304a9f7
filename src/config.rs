//! Pipeline configuration.
//!
//! Every section has defaults, so a config file only needs the keys it
//! changes. Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoverError, Result};

/// Deepest S2 cell level.
pub const MAX_CELL_LEVEL: u8 = 30;

/// Resolution budget handed to the region coverer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveringOptions {
    /// Minimum S2 cell level (0-30). Lower = coarser cells.
    pub min_level: u8,

    /// Maximum S2 cell level (0-30). Higher = finer cells.
    pub max_level: u8,

    /// Maximum number of cells per loop covering.
    pub max_cells: usize,
}

impl Default for CoveringOptions {
    fn default() -> Self {
        Self {
            min_level: 5,
            max_level: 20,
            max_cells: 1000,
        }
    }
}

/// Size ceiling for feature coverings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Features with more outer or hole cells than this are skipped.
    #[serde(alias = "skip_cells")]
    pub max_cell_features: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_cell_features: 1000,
        }
    }
}

/// Output layout and formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving every output file. Created if missing.
    pub directory: PathBuf,

    /// Write one collection per feature instead of one combined collection.
    pub separate: bool,

    /// Indent output GeoJSON.
    pub pretty: bool,

    /// Emit marker point features alongside the coverings.
    pub include_markers: bool,

    /// Emit an outline of ancestor cells at this level.
    pub grid_level: Option<u8>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            separate: false,
            pretty: true,
            include_markers: false,
            grid_level: None,
        }
    }
}

/// simplestyle colours and widths for overlay features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub outer_stroke: String,
    pub outer_fill: String,
    pub hole_stroke: String,
    pub hole_fill: String,
    pub grid_stroke: String,
    pub stroke_width: u32,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            outer_stroke: "#008000".to_string(),
            outer_fill: "#80ff80".to_string(),
            hole_stroke: "#ff8080".to_string(),
            hole_fill: "#ff8080".to_string(),
            grid_stroke: "#808080".to_string(),
            stroke_width: 1,
            stroke_opacity: 1.0,
            fill_opacity: 0.3,
        }
    }
}

/// What to do with a feature whose ring cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Stop the run with the ring error
    #[default]
    Abort,
    /// Log the feature and carry on without it
    Skip,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub covering: CoveringOptions,
    pub guard: GuardConfig,
    pub output: OutputConfig,
    pub style: StyleConfig,
    pub on_degenerate: DegeneratePolicy,

    /// Compute coverings on the rayon pool. Classification stays sequential.
    pub parallel_covering: bool,
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject budgets the coverer cannot honour.
    pub fn validate(&self) -> Result<()> {
        let c = &self.covering;
        if c.max_level > MAX_CELL_LEVEL {
            return Err(CoverError::InvalidConfig(format!(
                "max_level {} exceeds {}",
                c.max_level, MAX_CELL_LEVEL
            )));
        }
        if c.min_level > c.max_level {
            return Err(CoverError::InvalidConfig(format!(
                "min_level {} is above max_level {}",
                c.min_level, c.max_level
            )));
        }
        if c.max_cells == 0 {
            return Err(CoverError::InvalidConfig(
                "max_cells must be at least 1".to_string(),
            ));
        }
        if let Some(level) = self.output.grid_level {
            if level > MAX_CELL_LEVEL {
                return Err(CoverError::InvalidConfig(format!(
                    "grid_level {} exceeds {}",
                    level, MAX_CELL_LEVEL
                )));
            }
        }
        Ok(())
    }
}
