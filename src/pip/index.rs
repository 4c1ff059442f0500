//! Spatial index over boundary polygon parts.

use geo::{BoundingRect, Intersects, MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

/// One polygon part of the boundary, wrapped for R-tree indexing
#[derive(Debug, Clone)]
pub struct IndexedPart {
    pub geometry: MultiPolygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPart {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPart {
    pub fn new(geometry: MultiPolygon<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self {
            geometry,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// R-tree of boundary parts.
///
/// A point is a member when it lies in any part. Membership is
/// edge-inclusive: a point on an outer ring or a hole edge is inside.
pub struct BoundaryIndex {
    tree: RTree<IndexedPart>,
}

impl std::fmt::Debug for BoundaryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryIndex")
            .field("parts", &self.tree.size())
            .finish()
    }
}

impl BoundaryIndex {
    /// Build the index; parts with no extent (empty geometry) are skipped.
    pub fn build(parts: Vec<MultiPolygon<f64>>) -> Self {
        let indexed: Vec<IndexedPart> = parts.into_iter().filter_map(IndexedPart::new).collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Boundary index built with {} parts", tree.size());

        Self { tree }
    }

    /// Check whether a lon/lat point falls in any part
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let point = Point::new(lon, lat);
        let query_envelope = AABB::from_point([lon, lat]);

        // Envelope candidates first, exact test second; stops at the first hit
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .any(|part| part.geometry.intersects(&point))
    }

    /// Number of indexed parts
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(min: f64, max: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
            (x: min, y: min),
        ]])
    }

    #[test]
    fn test_empty_index_rejects() {
        let index = BoundaryIndex::build(vec![]);
        assert!(index.is_empty());
        assert!(!index.contains(0.5, 0.5));
    }

    #[test]
    fn test_part_without_extent_is_skipped() {
        let index = BoundaryIndex::build(vec![MultiPolygon::new(vec![]), square(0.0, 1.0)]);
        assert_eq!(index.len(), 1);
        assert!(index.contains(0.5, 0.5));
    }

    #[test]
    fn test_any_part_matches() {
        let index = BoundaryIndex::build(vec![square(0.0, 1.0), square(10.0, 11.0)]);
        assert_eq!(index.len(), 2);
        assert!(index.contains(0.5, 0.5));
        assert!(index.contains(10.5, 10.5));
        assert!(!index.contains(5.0, 5.0));
    }

    #[test]
    fn test_hole_excludes_point() {
        let with_hole = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [
                [
                    (x: 4.0, y: 4.0),
                    (x: 6.0, y: 4.0),
                    (x: 6.0, y: 6.0),
                    (x: 4.0, y: 6.0),
                    (x: 4.0, y: 4.0),
                ],
            ],
        );
        let index = BoundaryIndex::build(vec![MultiPolygon::new(vec![with_hole])]);
        assert!(index.contains(2.0, 2.0));
        assert!(!index.contains(5.0, 5.0));
    }
}
