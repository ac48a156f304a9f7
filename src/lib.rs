//! s2cover - S2 cell coverings for GeoJSON features
//!
//! Converts polygons, multipolygons and linestrings into S2 cell coverings,
//! classifies marker points against them and writes annotated GeoJSON plus a
//! marker-to-feature membership table.

pub mod config;
pub mod covering;
pub mod error;
pub mod exchange;
pub mod geometry;
pub mod markers;
pub mod models;
pub mod pipeline;

pub use config::{CoveringOptions, DegeneratePolicy, PipelineConfig};
pub use error::{CoverError, Result};
pub use markers::{Classification, LabelCollector, Marker};
pub use models::{FeatureGeometry, FeatureRecord, Role};
pub use pipeline::{Pipeline, RunSummary};
