use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use geo_types::Coord;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::{CoverError, Result};
use crate::markers::Marker;
use crate::models::{feature_path, FeatureGeometry, FeatureRecord, RelationMeta};

/// Property holding relation membership, as written by osmtogeojson.
pub const RELATIONS_PROPERTY: &str = "@relations";

/// Parsed input: the original features and their pipeline records, index-aligned.
#[derive(Debug, Clone)]
pub struct InputCollection {
    pub features: Vec<Feature>,
    pub records: Vec<FeatureRecord>,
}

impl InputCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Open a file, decompressing it when the name ends in `.gz`.
fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Read a GeoJSON feature collection and prepare every feature for covering.
pub fn read_features(path: &Path) -> Result<InputCollection> {
    info!("Reading features from {}", path.display());
    let reader = open_maybe_gz(path)?;
    parse_features(reader)
}

/// Parse a feature collection from any reader.
pub fn parse_features<R: Read>(reader: R) -> Result<InputCollection> {
    let collection = match GeoJson::from_reader(reader)? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(_) => return Err(not_a_collection("Feature")),
        GeoJson::Geometry(_) => return Err(not_a_collection("Geometry")),
    };

    from_collection(collection)
}

fn not_a_collection(kind: &str) -> CoverError {
    CoverError::InvalidFeature {
        index: 0,
        reason: format!("expected a FeatureCollection, found a {}", kind),
    }
}

/// Build records for every feature of a collection.
pub fn from_collection(collection: FeatureCollection) -> Result<InputCollection> {
    let records = collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| feature_record(index, feature))
        .collect::<Result<Vec<_>>>()?;

    Ok(InputCollection {
        features: collection.features,
        records,
    })
}

/// Interpret one feature: relation metadata, path label and ring geometry.
pub fn feature_record(index: usize, feature: &Feature) -> Result<FeatureRecord> {
    let relation = match feature.property(RELATIONS_PROPERTY) {
        Some(value) => RelationMeta::from_property(value)
            .map_err(|reason| CoverError::InvalidFeature { index, reason })?,
        None => RelationMeta::default(),
    };

    let id = feature.id.as_ref().map(|id| match id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
    });

    let geometry = match &feature.geometry {
        Some(geometry) => convert_geometry(index, &geometry.value)?,
        None => FeatureGeometry::Unsupported,
    };

    Ok(FeatureRecord {
        index,
        path: feature_path(relation.rel, id.as_deref(), index),
        relation,
        geometry,
    })
}

fn convert_geometry(index: usize, value: &Value) -> Result<FeatureGeometry> {
    let geometry = match value {
        Value::Polygon(rings) => FeatureGeometry::Polygon(convert_rings(index, rings)?),
        Value::MultiPolygon(polygons) => FeatureGeometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| convert_rings(index, rings))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::LineString(line) => FeatureGeometry::LineString(convert_ring(index, line)?),
        _ => FeatureGeometry::Unsupported,
    };
    Ok(geometry)
}

fn convert_rings(index: usize, rings: &[Vec<Vec<f64>>]) -> Result<Vec<Vec<Coord<f64>>>> {
    rings.iter().map(|ring| convert_ring(index, ring)).collect()
}

fn convert_ring(index: usize, ring: &[Vec<f64>]) -> Result<Vec<Coord<f64>>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(CoverError::InvalidFeature {
                index,
                reason: format!("position with {} values", position.len()),
            }),
        })
        .collect()
}

/// Read markers from a headerless `name, latitude, longitude` CSV file.
pub fn read_markers(path: &Path) -> Result<Vec<Marker>> {
    info!("Reading markers from {}", path.display());
    let reader = open_maybe_gz(path)?;
    parse_markers(reader)
}

/// Parse markers from any reader. Rows are numbered from 1 in errors.
pub fn parse_markers<R: Read>(reader: R) -> Result<Vec<Marker>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut markers = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = result?;

        if record.len() < 3 {
            return Err(CoverError::InvalidMarker {
                row,
                reason: format!("expected 3 fields, found {}", record.len()),
            });
        }

        let lat = parse_coordinate(row, "latitude", &record[1])?;
        let lng = parse_coordinate(row, "longitude", &record[2])?;
        markers.push(Marker::new(&record[0], lat, lng));
    }

    info!("Loaded {} markers", markers.len());
    Ok(markers)
}

fn parse_coordinate(row: usize, field: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| CoverError::InvalidMarker {
        row,
        reason: format!("{} {:?} is not a number", field, raw),
    })
}

/// Input file name without `.gz` and the GeoJSON extension.
pub fn input_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.is_empty() {
        "output".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::path::PathBuf;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "way/4242",
                "properties": {
                    "@relations": [{"role": "inner", "rel": 62422, "reltags": {"name": "Berlin"}}]
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [2, 0], [2, 2]]}
            },
            {
                "type": "Feature",
                "id": 17,
                "properties": null,
                "geometry": {"type": "Point", "coordinates": [3, 3]}
            }
        ]
    }"#;

    #[test]
    fn test_parse_features() {
        let input = parse_features(COLLECTION.as_bytes()).unwrap();
        assert_eq!(input.len(), 3);
        assert_eq!(input.features.len(), 3);

        let first = &input.records[0];
        assert_eq!(first.path, "relation/62422/way/4242");
        assert_eq!(first.role(), Role::Inner);
        assert_eq!(first.relation.name.as_deref(), Some("Berlin"));
        assert!(matches!(&first.geometry, FeatureGeometry::Polygon(rings) if rings[0].len() == 5));

        let second = &input.records[1];
        assert_eq!(second.path, "feature/2");
        assert_eq!(second.role(), Role::Outer);
        assert!(matches!(&second.geometry, FeatureGeometry::LineString(line) if line.len() == 3));

        let third = &input.records[2];
        assert_eq!(third.path, "17");
        assert_eq!(third.geometry, FeatureGeometry::Unsupported);
    }

    #[test]
    fn test_rejects_non_collection() {
        let json = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(
            parse_features(json.as_bytes()),
            Err(CoverError::InvalidFeature { .. })
        ));
    }

    #[test]
    fn test_malformed_relations_is_error() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"@relations": "outer"}, "geometry": null}
        ]}"#;
        assert!(matches!(
            parse_features(json.as_bytes()),
            Err(CoverError::InvalidFeature { index: 0, .. })
        ));
    }

    #[test]
    fn test_read_gzipped_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berlin.geojson.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(COLLECTION.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let input = read_features(&path).unwrap();
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_parse_markers() {
        let csv = "Brandenburger Tor, 52.5163, 13.3777\n\"Museum, Island\",52.5169,13.4019\n";
        let markers = parse_markers(csv.as_bytes()).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].name(), "Brandenburger Tor");
        assert_eq!(markers[0].lat(), 52.5163);
        assert_eq!(markers[1].name(), "Museum, Island");
        assert_eq!(markers[1].lng(), 13.4019);
    }

    #[test]
    fn test_marker_row_errors() {
        let short = "ok,1,2\nbroken,1\n";
        assert!(matches!(
            parse_markers(short.as_bytes()),
            Err(CoverError::InvalidMarker { row: 2, .. })
        ));

        let bad = "bad,north,2\n";
        assert!(matches!(
            parse_markers(bad.as_bytes()),
            Err(CoverError::InvalidMarker { row: 1, .. })
        ));
    }

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem(&PathBuf::from("data/berlin.geojson")), "berlin");
        assert_eq!(input_stem(&PathBuf::from("berlin.geojson.gz")), "berlin");
        assert_eq!(input_stem(&PathBuf::from("berlin")), "berlin");
    }
}
