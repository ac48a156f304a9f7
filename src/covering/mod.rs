//! Cell coverings for feature regions and the size ceiling applied to them.

mod engine;
mod guard;

pub use engine::{cover_region, Covering};
pub use guard::{SizeGuard, SkippedFeature};

use crate::config::CoveringOptions;
use crate::geometry::Shapes;

/// Outer and hole coverings of one feature
#[derive(Debug)]
pub struct FeatureCovering {
    pub outer: Covering,
    pub holes: Covering,
}

/// Cover a feature's regions.
///
/// The outer region is covered interior-only when the feature itself is a
/// hole of its relation; the hole region is always covered interior-only.
pub fn cover_shapes(shapes: &Shapes, feature_is_hole: bool, options: &CoveringOptions) -> FeatureCovering {
    FeatureCovering {
        outer: cover_region(&shapes.outer, feature_is_hole, options),
        holes: cover_region(&shapes.holes, true, options),
    }
}
