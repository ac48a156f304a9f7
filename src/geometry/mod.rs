//! Geometry conversion: rings to loops, features to regions, cells to rings.

pub mod projection;
pub mod region;
pub mod ring;
pub mod shape;

pub use projection::{cell_ring, CellRing};
pub use ring::{normalize_ring, Loop};
pub use shape::{build_shapes, Region, RegionKind, Shapes};
