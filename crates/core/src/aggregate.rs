//! Cell-type aggregation.
//!
//! Turns one neighbor record into one summary row: for every cell type in the
//! vocabulary, how many neighbors of that type lie within the radius and how
//! close the nearest one is.

use crate::codec::NeighborRecord;
use crate::error::Result;
use crate::model::{Annotations, CellType};

/// Per-cell summary: neighbor count and minimum distance per cell type,
/// indexed by [`CellType::column`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRow {
    pub cell_id: String,
    pub counts: [u32; CellType::COUNT],
    pub min_distances: [u32; CellType::COUNT],
}

impl AggregationRow {
    /// Row with no neighbors: zero counts, every minimum at `sentinel`.
    pub fn empty(cell_id: impl Into<String>, sentinel: u32) -> Self {
        Self {
            cell_id: cell_id.into(),
            counts: [0; CellType::COUNT],
            min_distances: [sentinel; CellType::COUNT],
        }
    }

    pub fn count(&self, cell_type: CellType) -> u32 {
        self.counts[cell_type.column()]
    }

    pub fn min_distance(&self, cell_type: CellType) -> u32 {
        self.min_distances[cell_type.column()]
    }

    /// Neighbors counted across all cell types.
    pub fn total_neighbors(&self) -> u32 {
        self.counts.iter().sum()
    }

    fn observe(&mut self, cell_type: CellType, distance: u32) {
        let col = cell_type.column();
        if self.counts[col] == 0 {
            self.min_distances[col] = distance;
        } else {
            self.min_distances[col] = self.min_distances[col].min(distance);
        }
        self.counts[col] += 1;
    }
}

/// Aggregates neighbor records against an annotation lookup.
#[derive(Debug, Clone)]
pub struct CellTypeAggregator<'a> {
    annotations: &'a Annotations,
    radius_px: f64,
    sentinel: u32,
}

impl<'a> CellTypeAggregator<'a> {
    pub const fn new(annotations: &'a Annotations, radius_px: f64, sentinel: u32) -> Self {
        Self {
            annotations,
            radius_px,
            sentinel,
        }
    }

    pub const fn annotations(&self) -> &'a Annotations {
        self.annotations
    }

    pub const fn radius_px(&self) -> f64 {
        self.radius_px
    }

    /// Summarize `record`.
    ///
    /// Entries beyond the radius and entries naming the source cell are
    /// ignored. A neighbor missing from the annotation lookup fails the row.
    pub fn aggregate(&self, record: &NeighborRecord) -> Result<AggregationRow> {
        let source = record.source();
        let mut row = AggregationRow::empty(source, self.sentinel);
        for (id, distance) in record.iter() {
            if f64::from(distance) > self.radius_px || id == source {
                continue;
            }
            row.observe(self.annotations.cell_type(id)?, distance);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MIN_DISTANCE_SENTINEL as SENTINEL;

    fn annotations() -> Annotations {
        [
            ("s_a", CellType::Tumor5),
            ("s_b", CellType::Tumor5),
            ("s_c", CellType::BCells22),
            ("s_d", CellType::Basal15),
        ]
        .into_iter()
        .map(|(id, t)| (id.to_string(), t))
        .collect()
    }

    #[test]
    fn counts_and_minimums_per_type() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let rec =
            NeighborRecord::from_pairs("s_a", [("s_a", 0), ("s_b", 40), ("s_c", 12), ("s_b", 7)]);
        let row = agg.aggregate(&rec).unwrap();

        assert_eq!(row.cell_id, "s_a");
        assert_eq!(row.count(CellType::Tumor5), 2);
        assert_eq!(row.min_distance(CellType::Tumor5), 7);
        assert_eq!(row.count(CellType::BCells22), 1);
        assert_eq!(row.min_distance(CellType::BCells22), 12);
        assert_eq!(row.total_neighbors(), 3);
    }

    #[test]
    fn absent_types_keep_sentinel() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let row = agg
            .aggregate(&NeighborRecord::from_pairs("s_a", [("s_c", 3)]))
            .unwrap();
        for t in CellType::ALL {
            if t == CellType::BCells22 {
                assert!(row.min_distance(t) < SENTINEL);
            } else {
                assert_eq!(row.count(t), 0);
                assert_eq!(row.min_distance(t), SENTINEL);
            }
        }
    }

    #[test]
    fn source_never_counts_itself() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let row = agg
            .aggregate(&NeighborRecord::from_pairs("s_a", [("s_a", 0)]))
            .unwrap();
        assert_eq!(row, AggregationRow::empty("s_a", SENTINEL));
    }

    #[test]
    fn radius_is_inclusive() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 12.0, SENTINEL);
        let rec = NeighborRecord::from_pairs("s_a", [("s_c", 12), ("s_d", 13)]);
        let row = agg.aggregate(&rec).unwrap();
        assert_eq!(row.count(CellType::BCells22), 1);
        assert_eq!(row.count(CellType::Basal15), 0);
    }

    #[test]
    fn out_of_radius_neighbor_need_not_be_annotated() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 10.0, SENTINEL);
        let rec = NeighborRecord::from_pairs("s_a", [("s_unknown", 500)]);
        assert!(agg.aggregate(&rec).is_ok());
    }

    #[test]
    fn unannotated_neighbor_fails() {
        let ann = annotations();
        let agg = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let err = agg
            .aggregate(&NeighborRecord::from_pairs("s_a", [("s_zz", 4)]))
            .unwrap_err();
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("s_zz"));
    }
}
