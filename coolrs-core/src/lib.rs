//! # coolrs-core
//!
//! Shared models for reading and writing genome contact matrices: the genomic
//! [`Bin`](models::Bin) axis of a matrix, [`GenomicRegion`](models::GenomicRegion)
//! selectors, and the columnar bin and pixel tables exchanged with a store.
//!
pub mod errors;
pub mod models;

pub use errors::*;
