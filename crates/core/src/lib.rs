//! cellhood - cell neighborhood discovery and cell-type aggregation for
//! serial-section tissue.

pub mod aggregate;
pub mod api;
pub mod assemble;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;
pub mod spatial;

pub use aggregate::{AggregationRow, CellTypeAggregator};
pub use api::{NeighborhoodPipeline, PassSummary};
pub use codec::NeighborRecord;
pub use config::{PipelineConfig, SearchStrategy};
pub use error::{HoodError, Result};
pub use model::{CellRecord, CellTable, CellType, Point3};
