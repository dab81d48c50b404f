pub const URI_SEPARATOR: &str = "::";

pub const FORMAT_NAME: &str = "coolrs::contact-matrix";
pub const FORMAT_VERSION: u32 = 1;
pub const GENERATED_BY: &str = concat!("coolrs-io ", env!("CARGO_PKG_VERSION"));

pub const INFO_FILE: &str = "info.json";
pub const BINS_FILE: &str = "bins.parquet";
pub const PIXELS_FILE: &str = "pixels.parquet";
pub const INDEXES_FILE: &str = "indexes.parquet";

pub const BIN1_COLUMN: &str = "bin1_id";
pub const BIN2_COLUMN: &str = "bin2_id";
pub const COUNT_COLUMN: &str = "count";
pub const BIN1_OFFSET_COLUMN: &str = "bin1_offset";
