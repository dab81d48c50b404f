//! # coolrs-matrix
//!
//! Load genome contact matrices from a chunked columnar [`Store`](coolrs_io::Store)
//! into sparse matrices, and save them back.
//!
//! Loading streams the pixel table in blocks of bin rows, assembles a CSR matrix,
//! applies the per-bin correction factors and derives the bins without data.
//! Saving runs the reverse path: missing bins are zeroed, the matrix is reduced to
//! its upper triangle, corrections are reverted out of the counts and the pixels
//! are written in partitions.
//!
//! ```no_run
//! use coolrs_io::ParquetStore;
//! use coolrs_matrix::{Cool, LoadOptions, SaveOptions};
//!
//! let mut store = ParquetStore;
//! let cool = Cool::new("matrix.cool::/resolutions/10000");
//!
//! let data = cool.load(&store, &LoadOptions::default().with_region("chr1")).unwrap();
//! cool.save(&mut store, &data, "chr1.cool", &SaveOptions::default()).unwrap();
//! ```
//!
pub mod config;
pub mod consts;
pub mod cool;
pub mod correction;
pub mod error;
pub mod matrix;
pub mod missing;
pub mod reader;
pub mod writer;

pub use config::{CoolConfig, LoadOptions, MissingBinStrategy, SaveOptions};
pub use cool::{Cool, MatrixData};
pub use correction::CorrectionOperator;
pub use error::{CoolError, Result};
pub use matrix::ContactMatrix;
