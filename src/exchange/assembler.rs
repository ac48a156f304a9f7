//! Overlay features for coverings and the layout of output collections.
//!
//! Overlays carry simplestyle properties so the output renders directly in
//! geojson.io-like viewers.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use hashbrown::HashSet;
use s2::cellid::CellID;
use serde_json::json;

use crate::config::StyleConfig;
use crate::covering::{Covering, FeatureCovering};
use crate::geometry::projection::{cell_ring, ring_positions, CellRing};
use crate::markers::{Marker, Membership};
use crate::models::FeatureRecord;

pub const CELL_IDS_PROPERTY: &str = "cellids";
pub const HOLE_CELL_IDS_PROPERTY: &str = "holecellids";
pub const GRID_CELL_IDS_PROPERTY: &str = "gridcellids";
/// Name of the relation a feature belongs to, when the input carries one
pub const RELATION_NAME_PROPERTY: &str = "relname";

/// Builds overlay and marker features.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    style: &'a StyleConfig,
    grid_level: Option<u8>,
}

impl<'a> Assembler<'a> {
    pub fn new(style: &'a StyleConfig, grid_level: Option<u8>) -> Self {
        Self { style, grid_level }
    }

    /// Overlays for one processed feature: outer, hole, then grid.
    ///
    /// Empty coverings produce no overlay.
    pub fn overlays(&self, record: &FeatureRecord, covering: &FeatureCovering) -> Vec<Feature> {
        let mut features = Vec::new();

        if !covering.outer.is_empty() {
            let (stroke, fill) = if record.is_hole() {
                (&self.style.hole_stroke, &self.style.hole_fill)
            } else {
                (&self.style.outer_stroke, &self.style.outer_fill)
            };
            features.push(self.cell_feature(
                covering.outer.rings(),
                covering.outer.tokens(),
                CELL_IDS_PROPERTY,
                stroke,
                Some(fill),
            ));
        }

        if !covering.holes.is_empty() {
            features.push(self.cell_feature(
                covering.holes.rings(),
                covering.holes.tokens(),
                HOLE_CELL_IDS_PROPERTY,
                &self.style.hole_stroke,
                Some(&self.style.hole_fill),
            ));
        }

        if let Some(name) = &record.relation.name {
            for overlay in features.iter_mut() {
                overlay.set_property(RELATION_NAME_PROPERTY, json!(name));
            }
        }

        if let Some(grid) = self.grid_overlay(&covering.outer) {
            features.push(grid);
        }

        features
    }

    /// Outline of the distinct grid-level ancestors of the covering's cells.
    ///
    /// Cells at or above the grid level have no ancestor there and are left out.
    pub fn grid_overlay(&self, covering: &Covering) -> Option<Feature> {
        let level = self.grid_level?;
        let parents = grid_cells(covering.cell_ids(), level);
        if parents.is_empty() {
            return None;
        }

        let rings: Vec<CellRing> = parents.iter().map(cell_ring).collect();
        let tokens: Vec<String> = parents.iter().map(|id| id.to_token()).collect();
        Some(self.cell_feature(
            &rings,
            &tokens,
            GRID_CELL_IDS_PROPERTY,
            &self.style.grid_stroke,
            None,
        ))
    }

    fn cell_feature(
        &self,
        rings: &[CellRing],
        tokens: &[String],
        ids_property: &str,
        stroke: &str,
        fill: Option<&String>,
    ) -> Feature {
        let polygons: Vec<Vec<Vec<Vec<f64>>>> =
            rings.iter().map(|ring| vec![ring_positions(ring)]).collect();

        let mut properties = JsonObject::new();
        properties.insert(ids_property.to_string(), json!(tokens));
        properties.insert("stroke".to_string(), json!(stroke));
        properties.insert("stroke-width".to_string(), json!(self.style.stroke_width));
        properties.insert("stroke-opacity".to_string(), json!(self.style.stroke_opacity));
        match fill {
            Some(fill) => {
                properties.insert("fill".to_string(), json!(fill));
                properties.insert("fill-opacity".to_string(), json!(self.style.fill_opacity));
            }
            None => {
                properties.insert("fill-opacity".to_string(), json!(0));
            }
        }

        feature(Value::MultiPolygon(polygons), properties)
    }
}

/// Distinct ancestors at `level` of cells finer than it, in first-seen order.
pub fn grid_cells(cell_ids: &[CellID], level: u8) -> Vec<CellID> {
    let level = level as u64;
    let mut seen = HashSet::new();
    let mut parents = Vec::new();
    for id in cell_ids {
        if id.level() <= level {
            continue;
        }
        let parent = id.parent(level);
        if seen.insert(parent.0) {
            parents.push(parent);
        }
    }
    parents
}

/// Point feature for a marker with its labels and, optionally, its status
/// against one feature.
pub fn marker_feature(marker: &Marker, labels: &[String], status: Option<Membership>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(marker.name()));
    properties.insert("cellid".to_string(), json!(marker.token()));
    properties.insert("within".to_string(), json!(labels));
    if let Some(status) = status {
        properties.insert("status".to_string(), json!(status.as_str()));
    }

    feature(Value::Point(vec![marker.lng(), marker.lat()]), properties)
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// File name of a feature's own collection in separate mode.
pub fn separate_file_name(record: &FeatureRecord) -> String {
    format!("{}_{:05}.geojson", record.file_stem(), record.index + 1)
}

/// Per-feature collection: overlays, the feature itself, then any markers.
pub fn separate_collection(overlays: Vec<Feature>, original: Feature, markers: Vec<Feature>) -> FeatureCollection {
    let mut features = overlays;
    features.push(original);
    features.extend(markers);
    collection(features)
}

/// Single collection of every input feature followed by all overlays.
#[derive(Debug, Clone, Default)]
pub struct CombinedCollection {
    originals: Vec<Feature>,
    overlays: Vec<Feature>,
}

impl CombinedCollection {
    pub fn new(originals: Vec<Feature>) -> Self {
        Self {
            originals,
            overlays: Vec::new(),
        }
    }

    pub fn push_overlays(&mut self, overlays: Vec<Feature>) {
        self.overlays.extend(overlays);
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Final collection, marker features appended last.
    pub fn finish(self, markers: Vec<Feature>) -> FeatureCollection {
        let mut features = self.originals;
        features.extend(self.overlays);
        features.extend(markers);
        collection(features)
    }
}

/// Look up one property of a feature.
pub fn property<'f>(feature: &'f Feature, key: &str) -> Option<&'f JsonValue> {
    feature.properties.as_ref().and_then(|p| p.get(key))
}
