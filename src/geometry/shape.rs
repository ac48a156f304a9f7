//! Shape building: feature geometry to outer and hole regions.

use geo::Coord;

use super::ring::{normalize_ring, Loop};
use crate::error::Result;
use crate::models::FeatureGeometry;

/// Whether a region was built from outer boundaries or from holes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Outer,
    Hole,
}

impl RegionKind {
    pub fn is_hole(&self) -> bool {
        matches!(self, RegionKind::Hole)
    }
}

/// A set of loops of one kind. Loops are kept side by side, never merged.
#[derive(Debug, Clone)]
pub struct Region {
    kind: RegionKind,
    loops: Vec<Loop>,
}

impl Region {
    pub fn new(kind: RegionKind) -> Self {
        Self {
            kind,
            loops: Vec::new(),
        }
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    fn push_ring(&mut self, ring: &[Coord<f64>]) -> Result<()> {
        let lp = normalize_ring(ring, self.kind.is_hole())?;
        self.loops.push(lp);
        Ok(())
    }
}

/// Outer and hole regions of one feature
#[derive(Debug, Clone)]
pub struct Shapes {
    pub outer: Region,
    pub holes: Region,
}

impl Shapes {
    fn empty() -> Self {
        Self {
            outer: Region::new(RegionKind::Outer),
            holes: Region::new(RegionKind::Hole),
        }
    }

    /// Add a polygon: ring 0 is the outer boundary, rings 1.. are holes.
    fn add_polygon(&mut self, rings: &[Vec<Coord<f64>>]) -> Result<()> {
        for (index, ring) in rings.iter().enumerate() {
            if index == 0 {
                self.outer.push_ring(ring)?;
            } else {
                self.holes.push_ring(ring)?;
            }
        }
        Ok(())
    }
}

/// Build the outer and hole regions of a feature geometry.
///
/// Multi-polygons accumulate the loops of every member polygon. Line strings
/// become a single outer loop. Unsupported geometry yields empty regions.
pub fn build_shapes(geometry: &FeatureGeometry) -> Result<Shapes> {
    let mut shapes = Shapes::empty();

    match geometry {
        FeatureGeometry::Polygon(rings) => shapes.add_polygon(rings)?,
        FeatureGeometry::MultiPolygon(polygons) => {
            for rings in polygons {
                shapes.add_polygon(rings)?;
            }
        }
        FeatureGeometry::LineString(line) => shapes.outer.push_ring(line)?,
        FeatureGeometry::Unsupported => {}
    }

    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoverError;
    use geo::{Contains, Point};

    fn covers(region: &Region, x: f64, y: f64) -> bool {
        region
            .loops()
            .iter()
            .any(|lp| lp.polygon().contains(&Point::new(x, y)))
    }

    fn ring(min: f64, max: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x: min, y: min },
            Coord { x: max, y: min },
            Coord { x: max, y: max },
            Coord { x: min, y: max },
            Coord { x: min, y: min },
        ]
    }

    #[test]
    fn test_polygon_with_hole() {
        let geometry = FeatureGeometry::Polygon(vec![ring(0.0, 4.0), ring(1.0, 3.0)]);
        let shapes = build_shapes(&geometry).unwrap();

        assert_eq!(shapes.outer.loops().len(), 1);
        assert_eq!(shapes.holes.loops().len(), 1);
        assert!(!shapes.outer.loops()[0].is_hole());
        assert!(shapes.holes.loops()[0].is_hole());
        assert_eq!(shapes.holes.kind(), RegionKind::Hole);

        assert!(covers(&shapes.outer, 2.0, 2.0));
        assert!(covers(&shapes.holes, 2.0, 2.0));
        assert!(!covers(&shapes.holes, 0.5, 0.5));
    }

    #[test]
    fn test_multipolygon_concatenates() {
        let geometry = FeatureGeometry::MultiPolygon(vec![
            vec![ring(0.0, 1.0)],
            vec![ring(10.0, 12.0), ring(10.5, 11.0)],
        ]);
        let shapes = build_shapes(&geometry).unwrap();

        assert_eq!(shapes.outer.loops().len(), 2);
        assert_eq!(shapes.holes.loops().len(), 1);
        assert!(covers(&shapes.outer, 11.5, 11.5));
    }

    #[test]
    fn test_linestring_is_outer_only() {
        let line = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        let shapes = build_shapes(&FeatureGeometry::LineString(line)).unwrap();
        assert_eq!(shapes.outer.loops().len(), 1);
        assert!(shapes.holes.is_empty());
    }

    #[test]
    fn test_unsupported_is_empty() {
        let shapes = build_shapes(&FeatureGeometry::Unsupported).unwrap();
        assert!(shapes.outer.is_empty());
        assert!(shapes.holes.is_empty());
    }

    #[test]
    fn test_degenerate_hole_fails_feature() {
        let bad_hole = vec![Coord { x: 1.0, y: 1.0 }, Coord { x: 2.0, y: 2.0 }];
        let geometry = FeatureGeometry::Polygon(vec![ring(0.0, 4.0), bad_hole]);
        assert!(matches!(
            build_shapes(&geometry),
            Err(CoverError::DegenerateRing { .. })
        ));
    }
}
