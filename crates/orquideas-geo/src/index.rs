//! Bounding-box index over conservation areas

use geo::Rect;
use orquideas_core::models::ConservationArea;
use rstar::{RTree, RTreeObject, AABB};

/// Position of an area in the supplied slice plus its envelope
#[derive(Debug, Clone, PartialEq)]
struct AreaEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for AreaEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over area envelopes, answering "which areas might contain this point"
pub struct AreaIndex {
    tree: RTree<AreaEnvelope>,
}

impl AreaIndex {
    /// Build the index; areas without a bounding box can contain nothing and are left out
    pub fn build(areas: &[ConservationArea]) -> Self {
        let entries: Vec<AreaEnvelope> = areas
            .iter()
            .enumerate()
            .filter_map(|(position, area)| {
                area.bounding_rect().map(|rect| AreaEnvelope { position, envelope: envelope_of(rect) })
            })
            .collect();

        Self { tree: RTree::bulk_load(entries) }
    }

    /// Number of indexed areas
    pub fn area_count(&self) -> usize {
        self.tree.size()
    }

    /// Positions of areas whose envelope covers the point, ascending
    pub fn candidates(&self, x: f64, y: f64) -> Vec<usize> {
        let query = AABB::from_point([x, y]);
        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .collect();

        // Tree order is arbitrary; supplied order decides overlaps
        positions.sort_unstable();
        positions
    }
}

fn envelope_of(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, min: f64, max: f64) -> ConservationArea {
        ConservationArea::new(
            name,
            MultiPolygon::new(vec![polygon![
                (x: min, y: min),
                (x: max, y: min),
                (x: max, y: max),
                (x: min, y: max),
                (x: min, y: min),
            ]]),
        )
    }

    #[test]
    fn test_candidates_are_sorted_positions() {
        let areas = vec![square("outer", 0.0, 100.0), square("a", 0.0, 10.0), square("b", 5.0, 15.0)];
        let index = AreaIndex::build(&areas);

        assert_eq!(index.area_count(), 3);
        assert_eq!(index.candidates(7.0, 7.0), vec![0, 1, 2]);
        assert_eq!(index.candidates(50.0, 50.0), vec![0]);
        assert!(index.candidates(500.0, 500.0).is_empty());
    }

    #[test]
    fn test_empty_geometry_is_not_indexed() {
        let areas = vec![ConservationArea::new("vacia", MultiPolygon::new(vec![])), square("a", 0.0, 1.0)];
        let index = AreaIndex::build(&areas);

        assert_eq!(index.area_count(), 1);
        assert_eq!(index.candidates(0.5, 0.5), vec![1]);
    }

    #[test]
    fn test_envelope_boundary_is_a_candidate() {
        // The containment test, not the envelope, rejects boundary points
        let areas = vec![square("a", 0.0, 10.0)];
        let index = AreaIndex::build(&areas);
        assert_eq!(index.candidates(10.0, 5.0), vec![0]);
    }
}
