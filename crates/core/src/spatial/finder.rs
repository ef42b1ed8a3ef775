//! Neighbor discovery.
//!
//! For every cell, every cell (itself included) whose rounded Euclidean
//! distance is at most the discovery radius is a neighbor. Neighbors are
//! listed in table row order, so the indexed and exhaustive strategies
//! produce byte-identical neighbor lists.

use std::io::Write;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info};

use super::index::CellIndex;
use crate::codec::{NeighborListWriter, NeighborRecord};
use crate::config::SearchStrategy;
use crate::error::Result;
use crate::model::{CellTable, Point3};

/// Distance rounded to the nearest pixel, ties to even.
#[inline]
pub fn rounded_distance(a: &Point3, b: &Point3) -> u32 {
    a.distance(b).round_ties_even() as u32
}

/// Radius queries over an assembled table.
pub struct NeighborFinder<'a> {
    table: &'a CellTable,
    points: Vec<Point3>,
    radius_px: f64,
    index: Option<CellIndex>,
}

impl<'a> NeighborFinder<'a> {
    /// `radius_px` is inclusive and compared against rounded distances.
    pub fn new(table: &'a CellTable, radius_px: f64, strategy: SearchStrategy) -> Self {
        let points: Vec<Point3> = table.cells().iter().map(|c| c.position).collect();
        let index = match strategy {
            SearchStrategy::Indexed => Some(CellIndex::build(&points)),
            SearchStrategy::Exhaustive => None,
        };
        Self {
            table,
            points,
            radius_px,
            index,
        }
    }

    pub const fn radius_px(&self) -> f64 {
        self.radius_px
    }

    pub fn strategy(&self) -> SearchStrategy {
        if self.index.is_some() {
            SearchStrategy::Indexed
        } else {
            SearchStrategy::Exhaustive
        }
    }

    /// Neighbor record of the cell at `row`.
    pub fn neighbors_of(&self, row: usize) -> NeighborRecord {
        let cells = self.table.cells();
        let center = self.points[row];
        let mut record = NeighborRecord::new(cells[row].id.as_str());

        let mut visit = |j: usize| {
            let d = rounded_distance(&center, &self.points[j]);
            if f64::from(d) <= self.radius_px {
                record.push(cells[j].id.as_str(), d);
            }
        };

        match &self.index {
            // A raw distance up to radius + 0.5 can still round into range.
            Some(index) => index
                .rows_within(center, self.radius_px + 1.0)
                .into_iter()
                .for_each(&mut visit),
            None => (0..self.points.len()).for_each(&mut visit),
        }
        record
    }

    /// Compute every record and stream it to `writer` in table order.
    ///
    /// Cells are processed `chunk_size` at a time on `pool`; only one chunk of
    /// records is held in memory. Returns the number of records written.
    pub fn write_all<W: Write>(
        &self,
        pool: &ThreadPool,
        chunk_size: usize,
        writer: &mut NeighborListWriter<W>,
    ) -> Result<usize> {
        let total = self.table.len();
        let chunk_size = chunk_size.max(1);
        let start = Instant::now();
        info!(
            cells = total,
            radius_px = self.radius_px,
            strategy = ?self.strategy(),
            "computing neighbors"
        );

        let mut written = 0;
        for chunk_start in (0..total).step_by(chunk_size) {
            let chunk_end = (chunk_start + chunk_size).min(total);
            let records: Vec<NeighborRecord> = pool.install(|| {
                (chunk_start..chunk_end)
                    .into_par_iter()
                    .map(|row| self.neighbors_of(row))
                    .collect()
            });
            for record in &records {
                writer.write_record(record)?;
            }
            written += records.len();
            debug!(
                written,
                total,
                elapsed_s = start.elapsed().as_secs(),
                "neighbor chunk written"
            );
        }

        info!(
            records = written,
            elapsed_s = start.elapsed().as_secs(),
            "neighbor list complete"
        );
        Ok(written)
    }
}
