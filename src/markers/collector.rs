//! Owner of every marker's accumulated containment labels.

use super::classifier::Classification;
use super::Marker;

/// Labels per marker, appended feature by feature.
///
/// Each classification must be recorded exactly once; recording the same
/// feature twice duplicates its labels.
#[derive(Debug, Clone, Default)]
pub struct LabelCollector {
    labels: Vec<Vec<String>>,
}

impl LabelCollector {
    pub fn new(marker_count: usize) -> Self {
        Self {
            labels: vec![Vec::new(); marker_count],
        }
    }

    /// Append the feature label to every contained and hole marker.
    pub fn record(&mut self, classification: &Classification) {
        for (index, membership) in classification.members() {
            let Some(label) = classification.label(membership) else {
                continue;
            };
            if let Some(labels) = self.labels.get_mut(index) {
                labels.push(label);
            }
        }
    }

    pub fn labels_for(&self, index: usize) -> &[String] {
        self.labels.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn marker_count(&self) -> usize {
        self.labels.len()
    }

    /// Total labels across all markers.
    pub fn row_count(&self) -> usize {
        self.labels.iter().map(Vec::len).sum()
    }

    /// `(marker name, label)` pairs, markers in input order and labels in
    /// recording order.
    pub fn rows<'a>(&'a self, markers: &'a [Marker]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        markers
            .iter()
            .zip(self.labels.iter())
            .flat_map(|(marker, labels)| {
                labels.iter().map(move |label| (marker.name(), label.as_str()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(path: &str, contained: Vec<usize>, hole: Vec<usize>, nearby: Vec<usize>) -> Classification {
        Classification {
            path: path.to_string(),
            contained,
            hole,
            nearby,
        }
    }

    #[test]
    fn test_labels_accumulate_in_recording_order() {
        let markers = vec![Marker::new("a", 0.0, 0.0), Marker::new("b", 1.0, 1.0)];
        let mut collector = LabelCollector::new(markers.len());

        collector.record(&classification("way/1", vec![0], vec![1], vec![]));
        collector.record(&classification("relation/2/way/3", vec![0, 1], vec![], vec![]));

        assert_eq!(collector.labels_for(0), ["way/1", "relation/2/way/3"]);
        assert_eq!(collector.labels_for(1), ["way/1 (hole)", "relation/2/way/3"]);
        assert_eq!(collector.row_count(), 4);

        let rows: Vec<_> = collector.rows(&markers).collect();
        assert_eq!(
            rows,
            vec![
                ("a", "way/1"),
                ("a", "relation/2/way/3"),
                ("b", "way/1 (hole)"),
                ("b", "relation/2/way/3"),
            ]
        );
    }

    #[test]
    fn test_nearby_adds_no_label() {
        let mut collector = LabelCollector::new(1);
        collector.record(&classification("way/1", vec![], vec![], vec![0]));
        assert!(collector.labels_for(0).is_empty());
        assert_eq!(collector.row_count(), 0);
    }

    #[test]
    fn test_recording_twice_duplicates() {
        let mut collector = LabelCollector::new(1);
        let c = classification("way/1", vec![0], vec![], vec![]);
        collector.record(&c);
        collector.record(&c);
        assert_eq!(collector.labels_for(0), ["way/1", "way/1"]);
    }

    #[test]
    fn test_out_of_range_index_ignored() {
        let mut collector = LabelCollector::new(1);
        collector.record(&classification("way/1", vec![5], vec![], vec![]));
        assert_eq!(collector.row_count(), 0);
        assert!(collector.labels_for(5).is_empty());
        assert_eq!(collector.marker_count(), 1);
    }
}
