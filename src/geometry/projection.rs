//! Cell to renderable ring projection.

use geo::{Coord, LineString, Winding};
use s2::cell::Cell;
use s2::cellid::CellID;

use super::region::to_lonlat;

/// Closed (lon, lat) ring of a cell: four corners plus the first repeated.
pub type CellRing = [Coord<f64>; 5];

/// Project a cell to its closed corner ring in (lon, lat) degrees.
///
/// Corners come from the cell in its own order and are flipped, keeping the
/// first corner in place, when they wind clockwise in lon/lat.
pub fn cell_ring(id: &CellID) -> CellRing {
    let cell = Cell::from(id);
    let v: Vec<Coord<f64>> = (0..4).map(|k| to_lonlat(&cell.vertex(k))).collect();

    let ring = [v[0], v[1], v[2], v[3], v[0]];
    if LineString::new(ring.to_vec()).is_cw() {
        [v[0], v[3], v[2], v[1], v[0]]
    } else {
        ring
    }
}

/// Convert a ring to exchange-format positions.
pub fn ring_positions(ring: &CellRing) -> Vec<Vec<f64>> {
    ring.iter().map(|c| vec![c.x, c.y]).collect()
}
