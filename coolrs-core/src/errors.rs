use thiserror::Error;

use crate::models::CountType;

#[derive(Error, Debug, PartialEq)]
pub enum RegionParseError {
    #[error("Empty region identifier")]
    Empty,

    #[error("Wrong chromosome format in `{0}`. Please check UCSC / ensembl notation.")]
    InvalidFormat(String),

    #[error("Invalid coordinate `{coordinate}` in region `{region}`")]
    InvalidCoordinate { region: String, coordinate: String },

    #[error("Region start must be smaller than its end: `{0}`")]
    EmptyRange(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column `{column}` has {found} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot combine {found} counts with a {expected} pixel table")]
    CountTypeMismatch { expected: CountType, found: CountType },

    #[error("Bin {index} has start {start} >= end {end}")]
    InvalidBin { index: usize, start: u64, end: u64 },
}
