//! Feature records as seen by the covering pipeline.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a feature inside its parent relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Filled area
    #[default]
    Outer,
    /// Exclusion (hole) inside a parent area
    Inner,
}

impl Role {
    /// Map a relation member role; only `inner` marks a hole
    pub fn from_osm_role(role: &str) -> Self {
        match role {
            "inner" => Role::Inner,
            _ => Role::Outer,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Role::Inner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Outer => write!(f, "outer"),
            Role::Inner => write!(f, "inner"),
        }
    }
}

/// Relation membership metadata carried in the `@relations` property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationMeta {
    pub role: Role,
    /// Relation id, used in the feature path
    pub rel: Option<i64>,
    /// Relation `name` tag
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    rel: Option<i64>,
    #[serde(default)]
    reltags: Option<serde_json::Map<String, Value>>,
}

impl RelationMeta {
    /// Parse the `@relations` property value. Only the first relation is used.
    pub fn from_property(value: &Value) -> Result<Self, String> {
        let relations: Vec<RawRelation> = serde_json::from_value(value.clone())
            .map_err(|e| format!("malformed @relations: {}", e))?;

        let Some(first) = relations.into_iter().next() else {
            return Ok(Self::default());
        };

        let name = first
            .reltags
            .as_ref()
            .and_then(|tags| tags.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Self {
            role: first
                .role
                .as_deref()
                .map(Role::from_osm_role)
                .unwrap_or_default(),
            rel: first.rel,
            name,
        })
    }
}

/// Geometry of an input feature, as ordered (lon, lat) rings
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// First ring is the outer boundary, the rest are holes
    Polygon(Vec<Vec<Coord<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Coord<f64>>>>),
    /// Open ring treated as an outer boundary
    LineString(Vec<Coord<f64>>),
    /// Anything the pipeline does not cover (points, collections, none)
    Unsupported,
}

/// One input feature prepared for covering
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    /// Position in the input collection (0-based)
    pub index: usize,
    /// Human-readable path label, e.g. `relation/62422/way/4242`
    pub path: String,
    pub relation: RelationMeta,
    pub geometry: FeatureGeometry,
}

impl FeatureRecord {
    pub fn role(&self) -> Role {
        self.relation.role
    }

    /// Whether the feature itself is a hole in its parent relation
    pub fn is_hole(&self) -> bool {
        self.relation.role.is_hole()
    }

    /// Path label with `/` replaced, usable as a file name stem
    pub fn file_stem(&self) -> String {
        self.path.replace('/', "_")
    }
}

/// Build a feature path label from relation id and feature id.
///
/// Features without an id are labelled by their 1-based input position.
pub fn feature_path(rel: Option<i64>, id: Option<&str>, index: usize) -> String {
    let mut path = String::new();
    if let Some(rel) = rel {
        path.push_str(&format!("relation/{}/", rel));
    }
    match id {
        Some(id) => path.push_str(id),
        None => path.push_str(&format!("feature/{}", index + 1)),
    }
    path
}
