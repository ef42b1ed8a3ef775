//! Coordinate assembly.
//!
//! Replaces each section's raw 2D pixel coordinates with its registered
//! coordinates and places the section on its z plane, giving one table in a
//! shared 3D pixel space.

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{HoodError, Result};
use crate::io::read_aligned;
use crate::model::{CellTable, Point3, section_index};

/// Assemble using the `<section>_aligned.csv` files of `config.input_dir`.
pub fn assemble_from_dir(table: CellTable, config: &PipelineConfig) -> Result<CellTable> {
    assemble_with(table, config, |section| {
        read_aligned(&config.aligned_path(section))
    })
}

/// Assemble with aligned coordinates supplied by `load(section)`.
///
/// Aligned rows are matched to the section's cells by position. Row order and
/// row count of the table are preserved.
pub fn assemble_with<F>(mut table: CellTable, config: &PipelineConfig, mut load: F) -> Result<CellTable>
where
    F: FnMut(&str) -> Result<Vec<(f64, f64)>>,
{
    let sections: Vec<(String, Vec<usize>)> = table
        .sections()
        .into_iter()
        .map(|(name, rows)| (name.to_string(), rows))
        .collect();

    for (section, rows) in &sections {
        let z = config.section_z_px(section_index(section)?);
        let aligned = load(section)?;
        if aligned.len() != rows.len() {
            return Err(HoodError::RowCountMismatch {
                section: section.clone(),
                metadata_rows: rows.len(),
                aligned_rows: aligned.len(),
            });
        }

        let cells = table.cells_mut();
        for (&row, &(x, y)) in rows.iter().zip(&aligned) {
            cells[row].position = Point3::new(x, y, z);
        }
        debug!(section = %section, cells = rows.len(), z_px = z, "aligned section");
    }

    info!(
        cells = table.len(),
        sections = sections.len(),
        "assembled 3D coordinates"
    );
    Ok(table)
}
