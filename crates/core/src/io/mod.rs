//! File readers and writers around the pipeline.
//!
//! - `metadata` - the per-cell metadata table
//! - `aligned` - per-section registered coordinates
//! - `table` - per-cell summary tables

mod aligned;
mod metadata;
mod table;

pub use aligned::{read_aligned, read_aligned_from};
pub use metadata::{read_metadata, read_metadata_from};
pub use table::{SummaryTableWriter, create_summary_table, summary_header};
