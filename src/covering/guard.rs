//! Cell-count ceiling for feature coverings.

use tracing::info;

/// A feature dropped because one of its coverings was too large.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFeature {
    pub path: String,
    pub outer_cells: usize,
    pub hole_cells: usize,
}

/// Rejects features whose outer or hole covering exceeds a cell ceiling.
#[derive(Debug, Clone, Copy)]
pub struct SizeGuard {
    ceiling: usize,
}

impl SizeGuard {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Check both covering sizes. Returns the skip record when either count
    /// is above the ceiling; a count equal to the ceiling passes.
    pub fn check(&self, path: &str, outer_cells: usize, hole_cells: usize) -> Option<SkippedFeature> {
        if outer_cells <= self.ceiling && hole_cells <= self.ceiling {
            return None;
        }

        info!("Skipping {} {} {}", path, outer_cells, hole_cells);

        Some(SkippedFeature {
            path: path.to_string(),
            outer_cells,
            hole_cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_is_inclusive() {
        let guard = SizeGuard::new(10);
        assert!(guard.check("way/1", 10, 0).is_none());
        assert!(guard.check("way/1", 10, 10).is_none());
    }

    #[test]
    fn test_one_over_ceiling_skips() {
        let guard = SizeGuard::new(10);
        let skipped = guard.check("way/1", 11, 3).unwrap();
        assert_eq!(
            skipped,
            SkippedFeature {
                path: "way/1".to_string(),
                outer_cells: 11,
                hole_cells: 3,
            }
        );
    }

    #[test]
    fn test_hole_covering_alone_can_skip() {
        let guard = SizeGuard::new(10);
        let skipped = guard.check("relation/5/way/9", 2, 11).unwrap();
        assert_eq!(skipped.hole_cells, 11);
        assert_eq!(skipped.path, "relation/5/way/9");
    }

    #[test]
    fn test_zero_ceiling() {
        let guard = SizeGuard::new(0);
        assert!(guard.check("way/1", 0, 0).is_none());
        assert!(guard.check("way/1", 1, 0).is_some());
    }
}
