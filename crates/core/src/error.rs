//! Error types for the cellhood pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for neighborhood computations.
///
/// Every variant aborts the enclosing pass; nothing is skipped or defaulted.
#[derive(Error, Debug)]
pub enum HoodError {
    #[error(
        "section {section}: metadata has {metadata_rows} cells but aligned coordinates have {aligned_rows} rows"
    )]
    RowCountMismatch {
        section: String,
        metadata_rows: usize,
        aligned_rows: usize,
    },

    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("malformed neighbor record at line {line}: {msg}")]
    Format { line: usize, msg: String },

    #[error("unknown cell type {annotation:?} for cell {cell_id}")]
    UnknownCellType { cell_id: String, annotation: String },

    #[error("missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl HoodError {
    /// Whether this error is one of the data integrity kinds.
    pub const fn is_data_integrity(&self) -> bool {
        matches!(self, Self::RowCountMismatch { .. } | Self::DataIntegrity(_))
    }
}

/// Convenience Result type alias for HoodError.
pub type Result<T> = std::result::Result<T, HoodError>;
