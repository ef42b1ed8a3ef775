//! Metadata table reader.
//!
//! The metadata table is a CSV export with a header row. The first column is
//! the cell identifier (its header is usually empty); section, raw x/y pixel
//! coordinates and the annotation are located by header name. Other columns
//! are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::MetadataColumns;
use crate::error::{HoodError, Result};
use crate::model::{CellRecord, CellTable, CellType, Point3};

/// Read the metadata table at `path`.
pub fn read_metadata(path: &Path, columns: &MetadataColumns) -> Result<CellTable> {
    if !path.exists() {
        return Err(HoodError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)?;
    read_metadata_from(BufReader::new(file), columns)
}

/// Read a metadata table from any reader.
///
/// Annotations are validated against the cell-type vocabulary here, so an
/// unknown label fails the load before any pass starts.
pub fn read_metadata_from<R: Read>(reader: R, columns: &MetadataColumns) -> Result<CellTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            HoodError::DataIntegrity(format!("metadata table has no {name:?} column"))
        })
    };
    let section_col = find(&columns.section)?;
    let x_col = find(&columns.x)?;
    let y_col = find(&columns.y)?;
    let annotation_col = find(&columns.annotation)?;

    let mut cells = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |col: usize| record.get(col).unwrap_or("");

        let id = field(0).to_string();
        if id.is_empty() {
            return Err(HoodError::DataIntegrity(format!(
                "metadata row {} has an empty cell id",
                cells.len() + 1
            )));
        }
        let row = cells.len() + 1;
        let coord = |col: usize, name: &str| match field(col).trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(HoodError::DataIntegrity(format!(
                "metadata row {row}, cell {id}: {name} value {:?} is not a finite number",
                field(col)
            ))),
        };
        let x = coord(x_col, &columns.x)?;
        let y = coord(y_col, &columns.y)?;

        let annotation = field(annotation_col);
        let cell_type =
            CellType::from_label(annotation).ok_or_else(|| HoodError::UnknownCellType {
                cell_id: id.clone(),
                annotation: annotation.to_string(),
            })?;

        cells.push(CellRecord {
            section: field(section_col).to_string(),
            position: Point3::new(x, y, 0.0),
            cell_type,
            id,
        });
    }

    CellTable::new(cells)
}
