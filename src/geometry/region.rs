//! Spherical region predicates for loops.
//!
//! The S2 region coverer drives its search through the [`Region`] trait. A
//! [`Loop`] answers cell containment and intersection by comparing its planar
//! lon/lat polygon with the cell's outline, densified along each cell edge so
//! the outline follows the cell's great-circle boundary.
//!
//! Cells whose outline cannot be drawn in lon/lat (crossing the antimeridian
//! or wrapping a pole) fall back to the loop's bounding cap: they are never
//! reported as contained, and reported as intersecting when the cap touches
//! them. The coverer then refines them like any other boundary cell.

use std::f64::consts::PI;

use geo::{Contains, Coord, Intersects, LineString, Polygon};
use s2::cap::Cap;
use s2::cell::Cell;
use s2::latlng::LatLng;
use s2::point::Point;
use s2::r3::vector::Vector;
use s2::rect::Rect;
use s2::region::Region;
use s2::s1::{Angle, Rad};

use super::ring::Loop;

/// Samples taken per edge when densifying outlines and bounding caps.
const EDGE_SAMPLES: usize = 4;

/// Relative slack added to loop cap radii. Planar lon/lat edges bow away from
/// the great circle through their endpoints.
const CAP_PADDING: f64 = 0.05;

impl Region for Loop {
    fn cap_bound(&self) -> Cap {
        bounding_cap(self)
    }

    fn rect_bound(&self) -> Rect {
        self.cap_bound().rect_bound()
    }

    fn contains_cell(&self, cell: &Cell) -> bool {
        match cell_outline(cell) {
            Some(outline) => self.polygon().contains(&outline),
            None => false,
        }
    }

    fn intersects_cell(&self, cell: &Cell) -> bool {
        match cell_outline(cell) {
            Some(outline) => self.polygon().intersects(&outline),
            None => self.cap_bound().intersects_cell(cell),
        }
    }
}

/// Bounding cap of a loop: centred on the normalized vertex sum, wide enough
/// to reach every vertex and every sampled point along its planar edges.
pub fn bounding_cap(lp: &Loop) -> Cap {
    let sum = lp
        .points()
        .iter()
        .fold(Vector { x: 0.0, y: 0.0, z: 0.0 }, |acc, p| acc + p.0);
    if sum.norm() < 1e-12 {
        // Vertices balance out around the sphere; nothing smaller is safe.
        return Cap::from_center_angle(&lp.points()[0], &Angle::from(Rad(PI)));
    }
    let center = Point(sum.normalize());

    let coords = lp.coords();
    let mut radius: f64 = 0.0;
    for (i, a) in coords.iter().enumerate() {
        let b = &coords[(i + 1) % coords.len()];
        for s in 0..EDGE_SAMPLES {
            let t = s as f64 / EDGE_SAMPLES as f64;
            let sample = LatLng::from_degrees(a.y + (b.y - a.y) * t, a.x + (b.x - a.x) * t);
            radius = radius.max(center.distance(&Point::from(&sample)).rad());
        }
    }

    let padded = (radius * (1.0 + CAP_PADDING)).min(PI);
    Cap::from_center_angle(&center, &Angle::from(Rad(padded)))
}

/// Lon/lat outline of a cell with each great-circle edge densified, or `None`
/// when the outline would cross the antimeridian.
pub fn cell_outline(cell: &Cell) -> Option<Polygon<f64>> {
    let corners: Vec<Point> = (0..4).map(|k| cell.vertex(k)).collect();

    let mut coords = Vec::with_capacity(4 * EDGE_SAMPLES + 1);
    for k in 0..4 {
        let a = &corners[k];
        let b = &corners[(k + 1) % 4];
        for s in 0..EDGE_SAMPLES {
            let t = s as f64 / EDGE_SAMPLES as f64;
            coords.push(to_lonlat(&slerp_approx(a, b, t)));
        }
    }

    if !is_projectable(&coords) {
        return None;
    }

    coords.push(coords[0]);
    Some(Polygon::new(LineString::new(coords), vec![]))
}

/// Convert a unit-sphere point to (lon, lat) degrees.
pub fn to_lonlat(p: &Point) -> Coord<f64> {
    let ll = LatLng::from(p);
    Coord {
        x: ll.lng.deg(),
        y: ll.lat.deg(),
    }
}

/// Point on the great circle between `a` and `b`, by normalized chord
/// interpolation.
fn slerp_approx(a: &Point, b: &Point, t: f64) -> Point {
    Point((a.0 + (b.0 - a.0) * t).normalize())
}

/// A closed outline is drawable in lon/lat when no step jumps more than half
/// way around the globe. A ring around a pole always has such a jump.
fn is_projectable(coords: &[Coord<f64>]) -> bool {
    coords
        .iter()
        .zip(coords.iter().cycle().skip(1))
        .all(|(a, b)| (b.x - a.x).abs() <= 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ring::normalize_ring;
    use s2::cellid::CellID;

    fn square(min: f64, max: f64) -> Loop {
        let ring = vec![
            Coord { x: min, y: min },
            Coord { x: max, y: min },
            Coord { x: max, y: max },
            Coord { x: min, y: max },
            Coord { x: min, y: min },
        ];
        normalize_ring(&ring, false).unwrap()
    }

    fn leaf_cell(lat: f64, lng: f64) -> Cell {
        let id = CellID::from(&LatLng::from_degrees(lat, lng));
        Cell::from(&id)
    }

    #[test]
    fn test_cap_reaches_every_vertex() {
        let lp = square(0.0, 1.0);
        let cap = lp.cap_bound();
        for p in lp.points() {
            assert!(cap.contains_point(p));
        }
        let far = Point::from(&LatLng::from_degrees(5.0, 5.0));
        assert!(!cap.contains_point(&far));
    }

    #[test]
    fn test_interior_leaf_cell_is_contained() {
        let lp = square(0.0, 1.0);
        let cell = leaf_cell(0.5, 0.5);
        assert!(lp.contains_cell(&cell));
        assert!(lp.intersects_cell(&cell));
    }

    #[test]
    fn test_distant_cell_is_disjoint() {
        let lp = square(0.0, 1.0);
        let cell = leaf_cell(10.0, 10.0);
        assert!(!lp.contains_cell(&cell));
        assert!(!lp.intersects_cell(&cell));
    }

    #[test]
    fn test_coarse_cell_straddling_boundary() {
        let lp = square(0.0, 1.0);
        // A level-6 cell near the face centre is wider than one degree.
        let id = CellID::from(&LatLng::from_degrees(0.5, 0.5)).parent(6);
        let cell = Cell::from(&id);
        assert!(lp.intersects_cell(&cell));
        assert!(!lp.contains_cell(&cell));
    }

    #[test]
    fn test_antimeridian_outline_is_not_projectable() {
        // Face 3 spans longitudes 135..-135 through the antimeridian.
        let id = CellID::from(&LatLng::from_degrees(10.0, 170.0)).parent(0);
        let cell = Cell::from(&id);
        assert!(cell_outline(&cell).is_none());
    }

    #[test]
    fn test_chord_midpoint_is_on_sphere_and_equidistant() {
        let a = Point::from(&LatLng::from_degrees(0.0, 0.0));
        let b = Point::from(&LatLng::from_degrees(0.0, 20.0));
        let mid = slerp_approx(&a, &b, 0.5);

        assert!((mid.0.norm() - 1.0).abs() < 1e-12);
        let (da, db) = (mid.distance(&a).rad(), mid.distance(&b).rad());
        assert!((da - db).abs() < 1e-12);
        assert!((to_lonlat(&mid).x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cap_centred_on_vertex_mean() {
        let lp = square(-1.0, 1.0);
        let cap = bounding_cap(&lp);
        let origin = Point::from(&LatLng::from_degrees(0.0, 0.0));
        assert!(cap.contains_point(&origin));
        // Half diagonal of the square is about 1.414 degrees.
        let radius_deg = cap.radius().rad().to_degrees();
        assert!(radius_deg > 1.4 && radius_deg < 1.6);
    }
}
