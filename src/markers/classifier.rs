//! Marker classification against one feature's coverings.
//!
//! A marker is contained when its leaf cell is inside the outer covering.
//! Contained markers are hole members when the cell is also inside the hole
//! covering, or when the feature is itself a relation hole. Markers that are
//! not contained but fall within the outer covering's bounding cap, widened
//! by a tenth of its radius, are reported as nearby.

use s2::cap::Cap;
use s2::s1::{Angle, Rad};
use tracing::debug;

use super::Marker;
use crate::covering::{Covering, FeatureCovering};

/// Fraction of the bounding cap radius added for the nearby test.
pub const PROXIMITY_EXPANSION: f64 = 0.1;

/// Suffix appended to a feature label for hole membership.
pub const HOLE_SUFFIX: &str = " (hole)";

/// How a marker relates to one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Contained,
    Hole,
    Nearby,
}

impl Membership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Membership::Contained => "contained",
            Membership::Hole => "hole",
            Membership::Nearby => "nearby",
        }
    }
}

/// Per-feature result: marker indices in three disjoint sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Feature path label
    pub path: String,
    pub contained: Vec<usize>,
    pub hole: Vec<usize>,
    pub nearby: Vec<usize>,
}

impl Classification {
    /// Label recorded for a marker with the given membership, if any.
    pub fn label(&self, membership: Membership) -> Option<String> {
        match membership {
            Membership::Contained => Some(self.path.clone()),
            Membership::Hole => Some(format!("{}{}", self.path, HOLE_SUFFIX)),
            Membership::Nearby => None,
        }
    }

    /// Every classified marker with its membership, in marker order.
    pub fn members(&self) -> Vec<(usize, Membership)> {
        let mut members: Vec<(usize, Membership)> = self
            .contained
            .iter()
            .map(|&i| (i, Membership::Contained))
            .chain(self.hole.iter().map(|&i| (i, Membership::Hole)))
            .chain(self.nearby.iter().map(|&i| (i, Membership::Nearby)))
            .collect();
        members.sort_by_key(|(i, _)| *i);
        members
    }

    pub fn is_empty(&self) -> bool {
        self.contained.is_empty() && self.hole.is_empty() && self.nearby.is_empty()
    }
}

/// Classify every marker against a feature's coverings.
pub fn classify(
    coverings: &FeatureCovering,
    feature_is_hole: bool,
    path: &str,
    markers: &[Marker],
) -> Classification {
    let mut result = Classification {
        path: path.to_string(),
        ..Default::default()
    };

    if coverings.outer.is_empty() {
        return result;
    }

    let cap = proximity_cap(&coverings.outer);

    for (index, marker) in markers.iter().enumerate() {
        if coverings.outer.contains_cell_id(marker.cell_id()) {
            if feature_is_hole || coverings.holes.contains_cell_id(marker.cell_id()) {
                result.hole.push(index);
            } else {
                result.contained.push(index);
            }
        } else if cap.contains_point(marker.point()) {
            result.nearby.push(index);
        }
    }

    debug!(
        path,
        contained = result.contained.len(),
        hole = result.hole.len(),
        nearby = result.nearby.len(),
        "Classified markers"
    );

    result
}

/// Bounding cap of a covering, widened by [`PROXIMITY_EXPANSION`] of its radius.
pub fn proximity_cap(covering: &Covering) -> Cap {
    let cap = covering.cap_bound();
    let widen = cap.radius().rad() * PROXIMITY_EXPANSION;
    cap.expanded(&Angle::from(Rad(widen)))
}
