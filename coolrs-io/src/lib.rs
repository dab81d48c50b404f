//! # Chunked columnar stores for contact matrices.
//!
//! A store holds one or more matrix nodes. Each node carries a bin table, a pixel
//! table sorted by `bin1_id`, and an offset index over `bin1_id` so callers can pull
//! a block of rows at a time instead of the whole pixel list.
//!
//! Two stores are provided: [`ParquetStore`], which keeps each node in a directory of
//! Apache Parquet files, and [`MemoryStore`], which keeps nodes in process.
//!
pub mod consts;
pub mod error;
pub mod index;
pub mod info;
pub mod memory;
pub mod parquet_store;
pub mod traits;
pub mod uri;

// re-expose core types
pub use error::*;
pub use info::*;
pub use memory::{MemoryHandle, MemoryStore};
pub use parquet_store::{ParquetHandle, ParquetStore};
pub use traits::*;
pub use uri::StoreUri;
