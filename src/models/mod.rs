//! Core data models for the covering pipeline.

pub mod feature;

pub use feature::{feature_path, FeatureGeometry, FeatureRecord, RelationMeta, Role};
