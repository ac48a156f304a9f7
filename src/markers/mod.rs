//! Marker points, their classification against coverings, and label collection.

mod classifier;
mod collector;
mod marker;

pub use classifier::{classify, proximity_cap, Classification, Membership, HOLE_SUFFIX, PROXIMITY_EXPANSION};
pub use collector::LabelCollector;
pub use marker::Marker;
