//! Neighborhood scope restrictions.
//!
//! Both restrictions only remove entries; the record's source is never
//! touched, and applying either one twice is the same as applying it once.

use crate::codec::NeighborRecord;
use crate::model::cell_in_section;

/// Keep only neighbors owned by `section`.
pub fn restrict_to_section(record: &mut NeighborRecord, section: &str) {
    record.retain(|id, _| cell_in_section(id, section));
}

/// Keep only neighbors at most `radius_px` away.
pub fn restrict_to_radius(record: &mut NeighborRecord, radius_px: f64) {
    record.retain(|_, d| f64::from(d) <= radius_px);
}

/// A section and/or radius restriction applied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeFilter {
    pub section: Option<String>,
    pub radius_px: Option<f64>,
}

impl ScopeFilter {
    /// Whole-volume scope, limited to `radius_px`.
    pub const fn volume(radius_px: f64) -> Self {
        Self {
            section: None,
            radius_px: Some(radius_px),
        }
    }

    /// In-section scope, limited to `radius_px`.
    pub fn section(section: impl Into<String>, radius_px: f64) -> Self {
        Self {
            section: Some(section.into()),
            radius_px: Some(radius_px),
        }
    }

    pub fn apply(&self, record: &mut NeighborRecord) {
        if let Some(section) = &self.section {
            restrict_to_section(record, section);
        }
        if let Some(radius) = self.radius_px {
            restrict_to_radius(record, radius);
        }
    }
}
