//! S2 covering generation.
//!
//! Each loop of a region is covered on its own and the per-loop results are
//! concatenated. Outer regions get a boundary-inclusive covering, holes an
//! interior covering, so a point near a hole's edge is never wrongly taken
//! out of the surrounding area.

use s2::cap::Cap;
use s2::cellid::CellID;
use s2::cellunion::CellUnion;
use s2::region::Region as _;
use s2::region::RegionCoverer;
use tracing::trace;

use crate::config::CoveringOptions;
use crate::geometry::projection::{cell_ring, CellRing};
use crate::geometry::Region;

/// Cells approximating one region.
#[derive(Debug)]
pub struct Covering {
    /// Cells in coverer order, loop after loop. May repeat across loops.
    cell_ids: Vec<CellID>,
    tokens: Vec<String>,
    rings: Vec<CellRing>,
    /// Normalized union of all cells, for containment tests
    union: CellUnion,
    interior: bool,
}

impl Covering {
    fn from_cells(cell_ids: Vec<CellID>, interior: bool) -> Self {
        let tokens = cell_ids.iter().map(|id| id.to_token()).collect();
        let rings = cell_ids.iter().map(cell_ring).collect();

        let mut union = CellUnion(cell_ids.clone());
        union.normalize();

        Self {
            cell_ids,
            tokens,
            rings,
            union,
            interior,
        }
    }

    /// A covering with no cells.
    pub fn empty(interior: bool) -> Self {
        Self::from_cells(Vec::new(), interior)
    }

    /// Number of cells, counting repeats across loops.
    pub fn len(&self) -> usize {
        self.cell_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_ids.is_empty()
    }

    /// Whether this is an interior-only covering.
    pub fn is_interior(&self) -> bool {
        self.interior
    }

    pub fn cell_ids(&self) -> &[CellID] {
        &self.cell_ids
    }

    /// Stable cell tokens, in covering order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Closed lon/lat ring per cell, in covering order.
    pub fn rings(&self) -> &[CellRing] {
        &self.rings
    }

    pub fn union(&self) -> &CellUnion {
        &self.union
    }

    /// Whether `id` lies inside any covering cell.
    pub fn contains_cell_id(&self, id: &CellID) -> bool {
        self.union.contains_cellid(id)
    }

    /// Bounding cap of the whole covering.
    pub fn cap_bound(&self) -> Cap {
        self.union.cap_bound()
    }
}

/// Build the region coverer for a resolution budget.
fn region_coverer(options: &CoveringOptions) -> RegionCoverer {
    RegionCoverer {
        min_level: options.min_level,
        max_level: options.max_level,
        level_mod: 1,
        max_cells: options.max_cells,
    }
}

/// Cover a region within the given budget.
///
/// With `interior` set only cells lying entirely inside a loop are returned;
/// otherwise the cells together contain every loop.
pub fn cover_region(region: &Region, interior: bool, options: &CoveringOptions) -> Covering {
    if region.is_empty() {
        return Covering::empty(interior);
    }

    let coverer = region_coverer(options);
    let mut cell_ids = Vec::new();

    for lp in region.loops() {
        let covering = if interior {
            coverer.interior_covering(lp)
        } else {
            coverer.covering(lp)
        };
        trace!(
            vertices = lp.len(),
            cells = covering.0.len(),
            interior,
            "Covered loop"
        );
        cell_ids.extend(covering.0);
    }

    Covering::from_cells(cell_ids, interior)
}
