//! Spatial neighbor search.
//!
//! - `index` - R-tree over cell centroids
//! - `finder` - per-cell radius queries and neighbor-list streaming

mod finder;
mod index;

pub use finder::{NeighborFinder, rounded_distance};
pub use index::CellIndex;
