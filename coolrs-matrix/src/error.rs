use thiserror::Error;

use coolrs_core::{RegionParseError, TableError};
use coolrs_io::StoreError;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum CoolError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Region(#[from] RegionParseError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Operation to load or save more than one region is not supported ({0} regions given)")]
    MultipleRegions(usize),

    #[error("Got {found} correction factors for a matrix with {expected} bins")]
    FactorLength { expected: usize, found: usize },

    #[error("Matrix of shape {rows}x{cols} does not match {bins} bins")]
    ShapeMismatch { rows: usize, cols: usize, bins: usize },

    #[error("Count {0} does not fit the requested integer encoding")]
    CountOverflow(f64),
}

pub type Result<T> = std::result::Result<T, CoolError>;
