//! Pipeline parameters.
//!
//! Contains [`PipelineConfig`], which controls unit conversion, z placement of
//! sections, neighborhood radii and where files are read from and written to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HoodError, Result};

/// Default pixel/micron conversion factor of the imaging platform.
pub const DEFAULT_PX_PER_MICRON: f64 = 5.6;

/// Minimum distance reported for a cell type with no neighbor in range.
pub const DEFAULT_MIN_DISTANCE_SENTINEL: u32 = 10_000;

/// How the neighbor finder enumerates candidate cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// R-tree radius query per cell.
    #[default]
    Indexed,
    /// Distance to every cell in the table.
    Exhaustive,
}

/// Header names of the metadata table columns the pipeline reads.
///
/// The cell identifier is always the first column, whatever its header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataColumns {
    pub section: String,
    pub x: String,
    pub y: String,
    pub annotation: String,
}

impl Default for MetadataColumns {
    fn default() -> Self {
        Self {
            section: "section".to_string(),
            x: "CenterX_global_px".to_string(),
            y: "CenterY_global_px".to_string(),
            annotation: "annotations".to_string(),
        }
    }
}

/// Parameters for a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pixels per micron, applied to z placement and to every radius.
    pub px_per_micron: f64,

    /// Physical distance in microns covered by `section_index_step` indices.
    pub section_spacing_um: i64,

    /// Section index that sits at z = 0.
    pub section_origin_index: i64,

    /// Number of section indices between two stacked sections.
    pub section_index_step: i64,

    /// Radius in microns used when the neighbor list is computed.
    pub discovery_radius_um: f64,

    /// Radius in microns used by the aggregation passes.
    pub aggregation_radius_um: f64,

    /// Minimum distance reported for cell types absent from a neighborhood.
    pub min_distance_sentinel: u32,

    /// Sections that get a 2D summary table.
    pub sections: Vec<String>,

    pub strategy: SearchStrategy,

    /// Number of cells or records processed per parallel batch before the
    /// batch is flushed to disk.
    pub chunk_size: usize,

    /// Worker threads. None uses the available parallelism.
    pub threads: Option<usize>,

    pub metadata_columns: MetadataColumns,

    /// Directory holding the metadata table and the aligned coordinate files.
    pub input_dir: PathBuf,

    /// Directory receiving the neighbor list and the summary tables.
    pub output_dir: PathBuf,

    /// File name of the metadata table inside `input_dir`.
    pub metadata_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            px_per_micron: DEFAULT_PX_PER_MICRON,
            section_spacing_um: 30,
            section_origin_index: 4,
            section_index_step: 6,
            discovery_radius_um: 250.0,
            aggregation_radius_um: 50.0,
            min_distance_sentinel: DEFAULT_MIN_DISTANCE_SENTINEL,
            sections: [10, 16, 22, 28]
                .iter()
                .map(|n| format!("section_{n}"))
                .collect(),
            strategy: SearchStrategy::Indexed,
            chunk_size: 4096,
            threads: None,
            metadata_columns: MetadataColumns::default(),
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("output"),
            metadata_file: "metadata.csv".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HoodError::MissingFile(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every downstream computation meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.px_per_micron.is_finite() && self.px_per_micron > 0.0) {
            return Err(HoodError::InvalidConfig(format!(
                "px_per_micron must be positive, got {}",
                self.px_per_micron
            )));
        }
        if self.section_index_step <= 0 {
            return Err(HoodError::InvalidConfig(format!(
                "section_index_step must be positive, got {}",
                self.section_index_step
            )));
        }
        for (name, radius) in [
            ("discovery_radius_um", self.discovery_radius_um),
            ("aggregation_radius_um", self.aggregation_radius_um),
        ] {
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(HoodError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {radius}"
                )));
            }
        }
        if self.aggregation_radius_um > self.discovery_radius_um {
            return Err(HoodError::InvalidConfig(format!(
                "aggregation radius {}um exceeds the discovery radius {}um",
                self.aggregation_radius_um, self.discovery_radius_um
            )));
        }
        if self.chunk_size == 0 {
            return Err(HoodError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(HoodError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert a length in microns to pixels.
    #[inline]
    pub fn microns_to_px(&self, microns: f64) -> f64 {
        microns * self.px_per_micron
    }

    /// z coordinate, in pixels, of the section with the given index.
    ///
    /// The micron offset is floor-divided before conversion, so indices that
    /// fall between two steps snap to the lower plane.
    pub fn section_z_px(&self, section_index: i64) -> f64 {
        let z_um = (self.section_spacing_um * (section_index - self.section_origin_index))
            .div_euclid(self.section_index_step);
        self.microns_to_px(z_um as f64)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.input_dir.join(&self.metadata_file)
    }

    pub fn aligned_path(&self, section: &str) -> PathBuf {
        self.input_dir.join(format!("{section}_aligned.csv"))
    }

    pub fn neighbor_list_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "neighbors_distance_{}.csv",
            format_radius(self.discovery_radius_um)
        ))
    }

    pub fn section_table_path(&self, section: &str) -> PathBuf {
        self.output_dir.join(format!(
            "2D_{section}_{}um.csv",
            format_radius(self.aggregation_radius_um)
        ))
    }

    pub fn volume_table_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "3D_{}um.csv",
            format_radius(self.aggregation_radius_um)
        ))
    }
}

/// Radius as it appears in file names: integral radii lose the fraction.
fn format_radius(radius: f64) -> String {
    if radius.fract() == 0.0 {
        format!("{}", radius as i64)
    } else {
        format!("{radius}")
    }
}
