//! Summary table writer.
//!
//! Columns: `cell_id`, one count column per cell type, then one
//! `<type>_min_dist` column per cell type, both in [`CellType::ALL`] order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::chain;

use crate::aggregate::AggregationRow;
use crate::error::{HoodError, Result};
use crate::model::CellType;

/// Suffix of the minimum-distance columns.
pub const MIN_DIST_SUFFIX: &str = "_min_dist";

/// Header row of a summary table.
pub fn summary_header() -> Vec<String> {
    chain!(
        ["cell_id".to_string()],
        CellType::ALL.iter().map(|t| t.label().to_string()),
        CellType::ALL
            .iter()
            .map(|t| format!("{}{MIN_DIST_SUFFIX}", t.label())),
    )
    .collect()
}

/// CSV writer for [`AggregationRow`]s.
pub struct SummaryTableWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> SummaryTableWriter<W> {
    /// Wrap `writer` and emit the header row.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(summary_header())?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_row(&mut self, row: &AggregationRow) -> Result<()> {
        self.writer.write_record(chain!(
            [row.cell_id.clone()],
            row.counts.iter().map(u32::to_string),
            row.min_distances.iter().map(u32::to_string),
        ))?;
        self.rows += 1;
        Ok(())
    }

    pub const fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| HoodError::Io(e.into_error()))
    }
}

/// Create (or truncate) a summary table at `path`.
pub fn create_summary_table(path: &Path) -> Result<SummaryTableWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    SummaryTableWriter::new(File::create(path)?)
}
