use std::ops::Range;

use coolrs_core::models::{BinTable, GenomicRegion, PixelTable};

use crate::error::{Result, StoreError};
use crate::info::{CreateOptions, StoreInfo};

///
/// An open matrix node of a store.
///
/// Implementors provide the full bin table and row-range pixel queries; region
/// queries are derived from those two.
///
pub trait StoreHandle {
    fn uri(&self) -> &str;

    fn info(&self) -> &StoreInfo;

    ///
    /// The complete bin table, including every normalization column.
    ///
    fn bin_table(&self) -> Result<BinTable>;

    ///
    /// Stored pixels whose `bin1_id` lies in `start..end`, in file order.
    /// Indices are absolute bin ids.
    ///
    fn pixel_rows(&self, start: usize, end: usize) -> Result<PixelTable>;

    ///
    /// Names of the bin table columns
    ///
    fn bin_columns(&self) -> Result<Vec<String>> {
        Ok(self.bin_table()?.column_names())
    }

    ///
    /// Index range of the bins covered by `region`
    ///
    fn bin_range(&self, region: &GenomicRegion) -> Result<Range<usize>> {
        self.bin_table()?
            .range_for(region)
            .ok_or_else(|| StoreError::UnknownRegion(region.to_string()))
    }

    ///
    /// The bin table, optionally restricted to the bins of one region
    ///
    fn bins(&self, region: Option<&GenomicRegion>) -> Result<BinTable> {
        let table = self.bin_table()?;
        match region {
            None => Ok(table),
            Some(region) => {
                let range = table
                    .range_for(region)
                    .ok_or_else(|| StoreError::UnknownRegion(region.to_string()))?;
                Ok(table.slice(range))
            }
        }
    }

    ///
    /// Pixels of the `region x region` block, indexed relative to the first bin
    /// of the region.
    ///
    fn pixel_rows_for_region(&self, region: &GenomicRegion) -> Result<PixelTable> {
        let range = self.bin_range(region)?;
        let rows = self.pixel_rows(range.start, range.end)?;
        Ok(rows.restrict_to(range))
    }
}

///
/// A chunked columnar store of contact matrices.
///
pub trait Store {
    type Handle: StoreHandle;

    ///
    /// All matrix nodes found at `path`, sorted, e.g. `["/resolutions/1000", "/resolutions/5000"]`.
    ///
    fn list_nodes(&self, path: &str) -> Result<Vec<String>>;

    ///
    /// Open the node addressed by `uri`. Fails with [`StoreError::Open`] carrying the
    /// uri and, when the path itself is readable, the nodes that do exist there.
    ///
    fn open(&self, uri: &str) -> Result<Self::Handle>;

    ///
    /// Write a matrix node. `pixels` is consumed in order and concatenated; pixels must be
    /// sorted by `bin1_id` across all partitions.
    ///
    fn create<I>(
        &mut self,
        uri: &str,
        bins: &BinTable,
        pixels: I,
        options: &CreateOptions,
    ) -> Result<StoreInfo>
    where
        I: IntoIterator<Item = PixelTable>;
}

pub(crate) fn check_bin_range(start: usize, end: usize, bin_count: usize) -> Result<()> {
    if start > end || end > bin_count {
        return Err(StoreError::BinRangeOutOfBounds {
            start,
            end,
            bin_count,
        });
    }
    Ok(())
}
