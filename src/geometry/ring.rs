//! Ring normalization.
//!
//! Turns a raw exchange-format ring into a loop the covering library can use:
//! closing point dropped, repeated vertices collapsed, holes reversed so every
//! loop is stored counter-clockwise.

use geo::{Coord, LineString, Polygon};
use hashbrown::HashSet;
use s2::latlng::LatLng;
use s2::point::Point;

use crate::error::{CoverError, Result};

/// A closed, non-degenerate loop of vertices.
///
/// The terminal vertex is never repeated. `coords` and `points` hold the same
/// vertices in the same order, as lon/lat degrees and as unit vectors.
#[derive(Debug, Clone)]
pub struct Loop {
    coords: Vec<Coord<f64>>,
    points: Vec<Point>,
    polygon: Polygon<f64>,
    is_hole: bool,
}

impl Loop {
    /// Vertices as (lon, lat) degrees.
    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    /// Vertices as points on the unit sphere.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Planar lon/lat polygon of this loop, closed.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Whether this loop was built from a hole ring.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Normalize a raw ring into a [`Loop`].
///
/// `ring` is the exchange-format coordinate sequence in (lon, lat) order.
/// Exchange-format holes wind clockwise; with `is_hole` set the vertex order
/// is reversed so the stored loop is counter-clockwise.
pub fn normalize_ring(ring: &[Coord<f64>], is_hole: bool) -> Result<Loop> {
    let mut coords: Vec<Coord<f64>> = ring.to_vec();

    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    canonicalize(&mut coords);

    let distinct = count_distinct(&coords);
    if distinct < 3 {
        return Err(CoverError::DegenerateRing { distinct });
    }

    if is_hole {
        coords.reverse();
    }

    let points = coords
        .iter()
        .map(|c| Point::from(&LatLng::from_degrees(c.y, c.x)))
        .collect();

    let mut closed = coords.clone();
    closed.push(coords[0]);
    let polygon = Polygon::new(LineString::new(closed), vec![]);

    Ok(Loop {
        coords,
        points,
        polygon,
        is_hole,
    })
}

/// Collapse runs of identical consecutive vertices, including the wrap-around
/// from the last vertex to the first.
fn canonicalize(coords: &mut Vec<Coord<f64>>) {
    coords.dedup();
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
}

fn count_distinct(coords: &[Coord<f64>]) -> usize {
    coords
        .iter()
        .map(|c| (c.x.to_bits(), c.y.to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn square() -> Vec<Coord<f64>> {
        vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)]
    }

    #[test]
    fn test_closing_point_dropped() {
        let mut closed = square();
        closed.push(c(0.0, 0.0));

        let from_closed = normalize_ring(&closed, false).unwrap();
        let from_open = normalize_ring(&square(), false).unwrap();

        assert_eq!(from_closed.len(), 4);
        assert_eq!(from_closed.coords(), from_open.coords());
    }

    #[test]
    fn test_hole_is_exact_reverse() {
        let mut closed = square();
        closed.push(c(0.0, 0.0));

        let outer = normalize_ring(&closed, false).unwrap();
        let hole = normalize_ring(&closed, true).unwrap();

        let mut reversed = outer.coords().to_vec();
        reversed.reverse();
        assert_eq!(hole.coords(), reversed.as_slice());
        assert!(hole.is_hole());
        assert!(!outer.is_hole());
    }

    #[test]
    fn test_repeated_vertices_collapsed() {
        let ring = vec![
            c(0.0, 0.0),
            c(1.0, 0.0),
            c(1.0, 0.0),
            c(1.0, 1.0),
            c(0.0, 1.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
        ];
        let lp = normalize_ring(&ring, false).unwrap();
        assert_eq!(lp.coords(), square().as_slice());
        assert_eq!(lp.points().len(), 4);
    }

    #[test]
    fn test_two_points_is_degenerate() {
        let ring = vec![c(0.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)];
        match normalize_ring(&ring, false) {
            Err(CoverError::DegenerateRing { distinct }) => assert_eq!(distinct, 2),
            other => panic!("expected degenerate ring, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_pair_is_degenerate() {
        let ring = vec![c(0.0, 0.0), c(1.0, 1.0), c(0.0, 0.0), c(1.0, 1.0)];
        assert!(matches!(
            normalize_ring(&ring, true),
            Err(CoverError::DegenerateRing { distinct: 2 })
        ));
    }

    #[test]
    fn test_empty_ring_is_degenerate() {
        assert!(matches!(
            normalize_ring(&[], false),
            Err(CoverError::DegenerateRing { distinct: 0 })
        ));
    }

    #[test]
    fn test_polygon_is_closed() {
        let lp = normalize_ring(&square(), false).unwrap();
        let exterior = lp.polygon().exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(exterior.0.first(), exterior.0.last());
    }
}
