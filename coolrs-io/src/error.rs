use std::io;
use thiserror::Error;

use coolrs_core::models::CountType;
use coolrs_core::{RegionParseError, TableError};

fn format_nodes(nodes: &Option<Vec<String>>) -> String {
    match nodes {
        Some(nodes) if !nodes.is_empty() => nodes.join(", "),
        Some(_) => "none".to_string(),
        None => "unknown".to_string(),
    }
}

/// Error type for coolrs-io operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be opened at the given uri.
    #[error(
        "Could not open {uri}. Maybe the path is wrong or the given node is not available. Available nodes: {}",
        format_nodes(.available)
    )]
    Open {
        uri: String,
        available: Option<Vec<String>>,
    },

    /// A store already exists at the uri and truncation was not requested.
    #[error("A matrix already exists at {0}")]
    AlreadyExists(String),

    /// A requested bin range does not fit the matrix.
    #[error("Bin range {start}..{end} is out of bounds for a matrix with {bin_count} bins")]
    BinRangeOutOfBounds {
        start: usize,
        end: usize,
        bin_count: usize,
    },

    /// No bin overlaps the requested region.
    #[error("Region {0} does not overlap any bin of the matrix")]
    UnknownRegion(String),

    /// Pixels handed to a writer were not sorted by `bin1_id`.
    #[error("Pixels must be sorted by bin1_id, found bin {found} after bin {previous}")]
    UnsortedPixels { previous: u64, found: u64 },

    /// A pixel refers to a bin that is not in the bin table.
    #[error("Pixel refers to bin {bin} but the bin table has {bin_count} bins")]
    PixelOutOfRange { bin: u64, bin_count: usize },

    /// A pixel partition does not use the count encoding of the store.
    #[error("Pixel partition encodes counts as {found}, the store expects {expected}")]
    CountTypeMismatch { expected: CountType, found: CountType },

    /// A table column is absent from a file.
    #[error("Missing column `{column}` in {path}")]
    MissingColumn { column: String, path: String },

    /// A table column is present but has an unexpected type.
    #[error("Column `{column}` in {path} has unsupported type {found}")]
    ColumnType {
        column: String,
        path: String,
        found: String,
    },

    /// The `bin1_offset` index does not match the bin table.
    #[error("Offset index in {path} has {found} entries, expected {expected}")]
    CorruptIndex {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Region(#[from] RegionParseError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid info document: {0}")]
    Info(#[from] serde_json::Error),
}

/// Result type alias for coolrs-io operations.
pub type Result<T> = std::result::Result<T, StoreError>;
