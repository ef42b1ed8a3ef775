//! Cell records and the tables that hold them.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use super::cell_type::CellType;
use crate::codec::FIELD_SEPARATOR;
use crate::error::{HoodError, Result};

/// Cell centroid in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn distance_2(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_2(other).sqrt()
    }

    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// One segmented cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub id: String,
    pub section: String,
    pub position: Point3,
    pub cell_type: CellType,
}

/// Cells in metadata row order.
///
/// Row order is significant: aligned coordinates are matched to cells by
/// position within their section, and neighbor lists list cells in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTable {
    cells: Vec<CellRecord>,
}

impl CellTable {
    /// Build a table, rejecting duplicate identifiers and identifiers that
    /// would break the neighbor-list line encoding.
    pub fn new(cells: Vec<CellRecord>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        seen.reserve(cells.len());
        for cell in &cells {
            if cell.id.contains([FIELD_SEPARATOR, '\n', '\r']) {
                return Err(HoodError::DataIntegrity(format!(
                    "cell id {:?} contains a field or line separator",
                    cell.id
                )));
            }
            if !seen.insert(cell.id.as_str()) {
                return Err(HoodError::DataIntegrity(format!(
                    "duplicate cell id {}",
                    cell.id
                )));
            }
        }
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellRecord] {
        &mut self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row indices per section, sections in order of first appearance.
    pub fn sections(&self) -> IndexMap<&str, Vec<usize>> {
        let mut sections: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (row, cell) in self.cells.iter().enumerate() {
            sections.entry(cell.section.as_str()).or_default().push(row);
        }
        sections
    }

    /// Cells of one section, in table order.
    pub fn section_subset(&self, section: &str) -> Self {
        Self {
            cells: self
                .cells
                .iter()
                .filter(|c| c.section == section)
                .cloned()
                .collect(),
        }
    }

    /// Identifier to cell-type lookup for every cell in the table.
    pub fn annotations(&self) -> Annotations {
        self.cells
            .iter()
            .map(|c| (c.id.clone(), c.cell_type))
            .collect()
    }
}

/// Cell identifier to cell-type lookup.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    types: FxHashMap<String, CellType>,
}

impl Annotations {
    pub fn get(&self, cell_id: &str) -> Option<CellType> {
        self.types.get(cell_id).copied()
    }

    /// Cell type of `cell_id`; an identifier missing from the metadata is a
    /// data integrity failure.
    pub fn cell_type(&self, cell_id: &str) -> Result<CellType> {
        self.get(cell_id).ok_or_else(|| {
            HoodError::DataIntegrity(format!("cell {cell_id} is not present in the metadata"))
        })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<(String, CellType)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (String, CellType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, section: &str) -> CellRecord {
        CellRecord {
            id: id.to_string(),
            section: section.to_string(),
            position: Point3::default(),
            cell_type: CellType::Basal15,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = CellTable::new(vec![cell("s_1_a", "s_1"), cell("s_1_a", "s_1")]).unwrap_err();
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("s_1_a"));
    }

    #[test]
    fn separator_in_id_is_rejected() {
        let err = CellTable::new(vec![cell("s_1_a,b", "s_1")]).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn sections_keep_first_appearance_order() {
        let table = CellTable::new(vec![
            cell("s_16_a", "s_16"),
            cell("s_10_a", "s_10"),
            cell("s_16_b", "s_16"),
        ])
        .unwrap();
        let sections = table.sections();
        let names: Vec<_> = sections.keys().copied().collect();
        assert_eq!(names, vec!["s_16", "s_10"]);
        assert_eq!(sections["s_16"], vec![0, 2]);
        assert_eq!(table.section_subset("s_16").len(), 2);
    }

    #[test]
    fn missing_annotation_names_the_cell() {
        let table = CellTable::new(vec![cell("s_1_a", "s_1")]).unwrap();
        let annotations = table.annotations();
        assert_eq!(annotations.cell_type("s_1_a").unwrap(), CellType::Basal15);
        let err = annotations.cell_type("s_1_zz").unwrap_err();
        assert!(err.to_string().contains("s_1_zz"));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert_eq!(a.distance(&b), 13.0);
    }
}
