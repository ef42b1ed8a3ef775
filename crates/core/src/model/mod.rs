//! Data model: cells, sections and the cell-type vocabulary.

pub mod cell;
pub mod cell_type;
pub mod section;

pub use cell::{Annotations, CellRecord, CellTable, Point3};
pub use cell_type::CellType;
pub use section::{cell_in_section, section_index};
