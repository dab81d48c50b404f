/// The default read chunk is `bin_count / CHUNK_DIVISOR` rows.
pub const CHUNK_DIVISOR: usize = 32;

/// Above this many pixels a save is split into [`LARGE_WRITE_PARTITIONS`] partitions.
pub const LARGE_WRITE_THRESHOLD: usize = 1_000_000;
pub const LARGE_WRITE_PARTITIONS: usize = 10_000;

pub const DEFAULT_CORRECTION_COLUMN: &str = "weight";
