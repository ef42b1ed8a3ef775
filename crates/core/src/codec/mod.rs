//! Neighbor-list codec.
//!
//! - `record` - the typed record and its line encoding
//! - `stream` - file-level reader and writer

mod record;
mod stream;

pub use record::{FIELD_SEPARATOR, NeighborRecord};
pub use stream::{
    NeighborListReader, NeighborListWriter, create_neighbor_list, open_neighbor_list,
};
