pub mod bin;
pub mod bin_table;
pub mod pixels;
pub mod region;

// re-export for cleaner imports
pub use self::bin::Bin;
pub use self::bin_table::{BinTable, ChromInfo};
pub use self::pixels::{CountType, Counts, PixelTable};
pub use self::region::GenomicRegion;
