//! Aligned coordinate reader.
//!
//! Registration writes one headerless CSV per section with two numeric
//! columns (x, y) and no cell identifier; rows follow the order of the
//! section's cells in the metadata table.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{HoodError, Result};

/// Read the aligned (x, y) pairs at `path`.
pub fn read_aligned(path: &Path) -> Result<Vec<(f64, f64)>> {
    if !path.exists() {
        return Err(HoodError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)?;
    read_aligned_from(BufReader::new(file), &path.display().to_string())
}

/// Read aligned pairs from any reader. `source` names the input in errors.
pub fn read_aligned_from<R: Read>(reader: R, source: &str) -> Result<Vec<(f64, f64)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut coords = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let value = |col: usize| -> Result<f64> {
            let raw = record.get(col).ok_or_else(|| {
                HoodError::DataIntegrity(format!(
                    "{source} row {}: expected two columns, found {}",
                    row + 1,
                    record.len()
                ))
            })?;
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(HoodError::DataIntegrity(format!(
                    "{source} row {}: {raw:?} is not a finite number",
                    row + 1
                ))),
            }
        };
        coords.push((value(0)?, value(1)?));
    }
    Ok(coords)
}
