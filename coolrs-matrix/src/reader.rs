use log::debug;
use num_traits::{NumCast, PrimInt};
use sprs::{CsMat, TriMat};

use coolrs_core::models::{GenomicRegion, PixelTable};
use coolrs_io::{StoreError, StoreHandle};

use crate::consts::CHUNK_DIVISOR;
use crate::error::Result;
use crate::matrix::ContactMatrix;

///
/// Default number of bin rows fetched per chunk: `bin_count / 32`, at least 1
///
pub fn default_chunk_size(bin_count: usize) -> usize {
    (bin_count / CHUNK_DIVISOR).max(1)
}

///
/// Width of the index buffers used while accumulating pixels
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    I32,
    I64,
}

impl IndexWidth {
    pub fn for_bins(bin_count: usize) -> Self {
        if bin_count > i32::MAX as usize {
            IndexWidth::I64
        } else {
            IndexWidth::I32
        }
    }
}

///
/// Pixel accumulator with `I`-typed index columns, pre-sized to the expected
/// pixel count.
///
struct PixelBuffer<I> {
    rows: Vec<I>,
    cols: Vec<I>,
    values: Vec<i64>,
}

impl<I: PrimInt> PixelBuffer<I> {
    fn with_capacity(capacity: usize) -> Self {
        PixelBuffer {
            rows: Vec::with_capacity(capacity),
            cols: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn index(bin: u64, bin_count: usize) -> Result<I> {
        <I as NumCast>::from(bin).ok_or_else(|| {
            StoreError::PixelOutOfRange { bin, bin_count }.into()
        })
    }

    fn extend(&mut self, pixels: &PixelTable, bin_count: usize) -> Result<()> {
        for i in 0..pixels.len() {
            let (bin1, bin2) = (pixels.bin1[i], pixels.bin2[i]);
            if bin1 as usize >= bin_count || bin2 as usize >= bin_count {
                return Err(StoreError::PixelOutOfRange {
                    bin: bin1.max(bin2),
                    bin_count,
                }
                .into());
            }

            self.rows.push(Self::index(bin1, bin_count)?);
            self.cols.push(Self::index(bin2, bin_count)?);
            // counts are cast to integers, truncating stray float encodings
            self.values.push(pixels.counts.get_i64(i).unwrap_or_default());
        }
        Ok(())
    }

    fn into_matrix(self, bin_count: usize) -> ContactMatrix {
        let to_usize = |v: I| v.to_usize().unwrap_or_default();
        let rows: Vec<usize> = self.rows.into_iter().map(to_usize).collect();
        let cols: Vec<usize> = self.cols.into_iter().map(to_usize).collect();

        let tri = TriMat::from_triplets((bin_count, bin_count), rows, cols, self.values);
        let csr: CsMat<i64> = tri.to_csr();
        ContactMatrix::Integer(csr)
    }
}

fn read_chunked<I: PrimInt, H: StoreHandle>(handle: &H, chunk_size: usize) -> Result<ContactMatrix> {
    let info = handle.info();
    let bin_count = info.bin_count;
    let mut buffer = PixelBuffer::<I>::with_capacity(info.nonzero_count);

    let mut start = 0;
    while start < bin_count {
        // the last chunk may be shorter
        let end = (start + chunk_size).min(bin_count);
        let rows = handle.pixel_rows(start, end)?;
        buffer.extend(&rows, bin_count)?;
        start = end;
    }

    Ok(buffer.into_matrix(bin_count))
}

///
/// Reconstruct the whole matrix, reading `chunk_size` bin rows at a time.
///
/// # Arguments
/// - handle: an open store node
/// - chunk_size: rows per read, defaults to [`default_chunk_size`]
///
pub fn read_matrix<H: StoreHandle>(handle: &H, chunk_size: Option<usize>) -> Result<ContactMatrix> {
    let bin_count = handle.info().bin_count;
    let chunk_size = chunk_size
        .unwrap_or_else(|| default_chunk_size(bin_count))
        .max(1);
    let width = IndexWidth::for_bins(bin_count);

    debug!(
        "Reading {} bins from {} in chunks of {} rows ({:?} indices)",
        bin_count,
        handle.uri(),
        chunk_size,
        width
    );

    match width {
        IndexWidth::I32 => read_chunked::<i32, H>(handle, chunk_size),
        IndexWidth::I64 => read_chunked::<i64, H>(handle, chunk_size),
    }
}

///
/// Reconstruct the `region x region` block of the matrix in one read. Indices
/// are relative to the first bin of the region.
///
pub fn read_region<H: StoreHandle>(handle: &H, region: &GenomicRegion) -> Result<ContactMatrix> {
    let range = handle.bin_range(region)?;
    let pixels = handle.pixel_rows_for_region(region)?;
    let bin_count = range.len();

    debug!(
        "Reading region {} ({} bins, {} pixels) from {}",
        region,
        bin_count,
        pixels.len(),
        handle.uri()
    );

    let matrix = match IndexWidth::for_bins(bin_count) {
        IndexWidth::I32 => {
            let mut buffer = PixelBuffer::<i32>::with_capacity(pixels.len());
            buffer.extend(&pixels, bin_count)?;
            buffer.into_matrix(bin_count)
        }
        IndexWidth::I64 => {
            let mut buffer = PixelBuffer::<i64>::with_capacity(pixels.len());
            buffer.extend(&pixels, bin_count)?;
            buffer.into_matrix(bin_count)
        }
    };
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    use coolrs_core::models::{Bin, BinTable, Counts};
    use coolrs_io::{CreateOptions, MemoryStore, Store};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn store_with(bin_count: usize, pixels: Vec<(u64, u64, i32)>) -> MemoryStore {
        let bins = BinTable::new(
            (0..bin_count as u64)
                .map(|i| Bin::new("chr1", i * 10, (i + 1) * 10))
                .collect(),
        )
        .unwrap();
        let table = PixelTable::new(
            pixels.iter().map(|p| p.0).collect(),
            pixels.iter().map(|p| p.1).collect(),
            Counts::Int32(pixels.iter().map(|p| p.2).collect()),
        )
        .unwrap();

        let mut store = MemoryStore::new();
        store
            .create("m.cool", &bins, vec![table], &CreateOptions::default())
            .unwrap();
        store
    }

    #[fixture]
    fn store() -> MemoryStore {
        store_with(
            7,
            vec![
                (0, 0, 3),
                (0, 4, 1),
                (1, 1, 2),
                (2, 3, 8),
                (2, 6, 1),
                (4, 4, 5),
                (5, 6, 2),
                (6, 6, 9),
            ],
        )
    }

    #[rstest]
    #[case(0, 1)]
    #[case(31, 1)]
    #[case(32, 1)]
    #[case(100, 3)]
    fn test_default_chunk_size(#[case] bins: usize, #[case] expected: usize) {
        assert_eq!(default_chunk_size(bins), expected);
    }

    #[rstest]
    fn test_index_width() {
        assert_eq!(IndexWidth::for_bins(1_000), IndexWidth::I32);
        assert_eq!(IndexWidth::for_bins(i32::MAX as usize), IndexWidth::I32);
        assert_eq!(IndexWidth::for_bins(i32::MAX as usize + 1), IndexWidth::I64);
    }

    #[rstest]
    fn test_chunk_size_does_not_change_result(store: MemoryStore) {
        let handle = store.open("m.cool").unwrap();
        let reference = read_matrix(&handle, Some(7)).unwrap();

        assert_eq!(reference.nnz(), 8);
        assert_eq!(reference.get(2, 3), Some(8.0));

        for chunk in 1..=9 {
            let chunked = read_matrix(&handle, Some(chunk)).unwrap();
            assert_eq!(chunked, reference, "chunk size {}", chunk);
        }
        assert_eq!(read_matrix(&handle, None).unwrap(), reference);
    }

    #[rstest]
    fn test_read_region() {
        let bins = BinTable::new(vec![
            Bin::new("chr1", 0, 10),
            Bin::new("chr1", 10, 20),
            Bin::new("chr2", 0, 10),
            Bin::new("chr2", 10, 20),
            Bin::new("chr2", 20, 30),
        ])
        .unwrap();
        let table = PixelTable::new(
            vec![0, 1, 2, 2, 3],
            vec![3, 1, 2, 4, 4],
            Counts::Int32(vec![7, 1, 4, 2, 6]),
        )
        .unwrap();
        let mut store = MemoryStore::new();
        store
            .create("r.cool", &bins, vec![table], &CreateOptions::default())
            .unwrap();

        let handle = store.open("r.cool").unwrap();
        let matrix = read_region(&handle, &GenomicRegion::chromosome("chr2")).unwrap();

        assert_eq!(matrix.shape(), (3, 3));
        assert_eq!(matrix.nnz(), 3);
        assert_eq!(matrix.get(0, 0), Some(4.0));
        assert_eq!(matrix.get(0, 2), Some(2.0));
        assert_eq!(matrix.get(1, 2), Some(6.0));
    }

    #[rstest]
    fn test_empty_store_reads_empty_matrix() {
        let store = store_with(4, vec![]);
        let handle = store.open("m.cool").unwrap();
        let matrix = read_matrix(&handle, None).unwrap();

        assert_eq!(matrix.shape(), (4, 4));
        assert_eq!(matrix.nnz(), 0);
    }
}
