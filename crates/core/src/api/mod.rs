//! High-level API: whole pipeline passes over input and output files.
//!
//! # Example
//!
//! ```ignore
//! use cellhood_core::api::NeighborhoodPipeline;
//! use cellhood_core::config::PipelineConfig;
//!
//! let pipeline = NeighborhoodPipeline::new(PipelineConfig::default())?;
//! pipeline.compute_neighbor_list()?;
//! pipeline.compute_volume_table()?;
//! ```

pub mod pipeline;

pub use pipeline::{
    NeighborhoodPipeline, PassScope, PassSummary, build_pool, summarize_records,
};
