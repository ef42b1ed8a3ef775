//! R-tree over cell centroids.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::model::Point3;

/// Centroid stored in the tree together with its table row.
#[derive(Clone, Debug)]
struct IndexedCell {
    row: usize,
    point: [f64; 3],
}

impl PartialEq for IndexedCell {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
    }
}

impl RTreeObject for IndexedCell {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedCell {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Bulk-loaded spatial index answering radius queries by table row.
pub struct CellIndex {
    tree: RTree<IndexedCell>,
}

impl CellIndex {
    pub fn build(points: &[Point3]) -> Self {
        let cells = points
            .iter()
            .enumerate()
            .map(|(row, p)| IndexedCell {
                row,
                point: p.to_array(),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(cells),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Rows whose centroid lies within `radius` of `center` (inclusive),
    /// in ascending row order.
    pub fn rows_within(&self, center: Point3, radius: f64) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|c| c.row)
            .collect();
        rows.sort_unstable();
        rows
    }
}
