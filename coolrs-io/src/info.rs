use serde::{Deserialize, Serialize};

use coolrs_core::models::{BinTable, ChromInfo, CountType};

use crate::consts::{FORMAT_NAME, FORMAT_VERSION, GENERATED_BY};

///
/// How the pixels of a matrix are laid out on disk
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// Only pixels with `bin1_id <= bin2_id` are stored; the lower triangle is implied.
    #[default]
    SymmetricUpper,
    /// Pixels are stored exactly as held, both triangles if present.
    Square,
}

///
/// Scalar metadata of one matrix node
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StoreInfo {
    pub format: String,
    pub format_version: u32,
    pub bin_count: usize,
    pub nonzero_count: usize,
    pub count_type: CountType,
    pub storage_mode: StorageMode,
    pub chromosomes: Vec<ChromInfo>,
    pub generated_by: String,
}

impl StoreInfo {
    pub fn new(
        bins: &BinTable,
        nonzero_count: usize,
        count_type: CountType,
        storage_mode: StorageMode,
    ) -> Self {
        StoreInfo {
            format: FORMAT_NAME.to_string(),
            format_version: FORMAT_VERSION,
            bin_count: bins.len(),
            nonzero_count,
            count_type,
            storage_mode,
            chromosomes: bins.chromosomes(),
            generated_by: GENERATED_BY.to_string(),
        }
    }
}

///
/// Options for creating a matrix node in a store
///
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOptions {
    /// Replace an existing node at the same uri.
    pub truncate_existing: bool,
    pub storage_mode: StorageMode,
    /// Encoding of the `count` column; every partition must match it.
    pub count_type: CountType,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions {
            truncate_existing: true,
            storage_mode: StorageMode::default(),
            count_type: CountType::default(),
        }
    }
}
