use coolrs_core::models::{CountType, PixelTable};

use crate::error::{Result, StoreError};

///
/// Builds the `bin1_offset` index while pixel partitions stream past:
/// `offsets[i]..offsets[i + 1]` is the span of pixel rows whose `bin1_id == i`.
///
pub struct OffsetIndexer {
    row_counts: Vec<u64>,
    previous: Option<u64>,
    count_type: CountType,
    nonzero_count: usize,
}

impl OffsetIndexer {
    pub fn new(bin_count: usize, count_type: CountType) -> Self {
        OffsetIndexer {
            row_counts: vec![0; bin_count],
            previous: None,
            count_type,
            nonzero_count: 0,
        }
    }

    ///
    /// Validate one partition and account for its rows
    ///
    pub fn push(&mut self, pixels: &PixelTable) -> Result<()> {
        if pixels.count_type() != self.count_type {
            return Err(StoreError::CountTypeMismatch {
                expected: self.count_type,
                found: pixels.count_type(),
            });
        }

        let bin_count = self.row_counts.len();
        for (&bin1, &bin2) in pixels.bin1.iter().zip(pixels.bin2.iter()) {
            if let Some(previous) = self.previous {
                if bin1 < previous {
                    return Err(StoreError::UnsortedPixels {
                        previous,
                        found: bin1,
                    });
                }
            }
            for bin in [bin1, bin2] {
                if bin as usize >= bin_count {
                    return Err(StoreError::PixelOutOfRange { bin, bin_count });
                }
            }

            self.row_counts[bin1 as usize] += 1;
            self.previous = Some(bin1);
        }

        self.nonzero_count += pixels.len();
        Ok(())
    }

    pub fn nonzero_count(&self) -> usize {
        self.nonzero_count
    }

    pub fn finish(self) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(self.row_counts.len() + 1);
        let mut total = 0u64;
        offsets.push(total);
        for count in self.row_counts {
            total += count;
            offsets.push(total);
        }
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use coolrs_core::models::Counts;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn table(bin1: Vec<u64>, bin2: Vec<u64>) -> PixelTable {
        let counts = Counts::Int32(vec![1; bin1.len()]);
        PixelTable::new(bin1, bin2, counts).unwrap()
    }

    #[rstest]
    fn test_offsets_across_partitions() {
        let mut indexer = OffsetIndexer::new(4, CountType::Int32);
        indexer.push(&table(vec![0, 0, 1], vec![0, 2, 1])).unwrap();
        indexer.push(&table(vec![1, 3], vec![3, 3])).unwrap();

        assert_eq!(indexer.nonzero_count(), 5);
        assert_eq!(indexer.finish(), vec![0, 2, 4, 4, 5]);
    }

    #[rstest]
    fn test_rejects_unsorted_partitions() {
        let mut indexer = OffsetIndexer::new(4, CountType::Int32);
        indexer.push(&table(vec![2], vec![2])).unwrap();
        let result = indexer.push(&table(vec![1], vec![3]));
        assert!(matches!(
            result,
            Err(StoreError::UnsortedPixels {
                previous: 2,
                found: 1
            })
        ));
    }

    #[rstest]
    fn test_rejects_out_of_range_bins() {
        let mut indexer = OffsetIndexer::new(2, CountType::Int32);
        let result = indexer.push(&table(vec![0], vec![5]));
        assert!(matches!(result, Err(StoreError::PixelOutOfRange { bin: 5, .. })));
    }

    #[rstest]
    fn test_rejects_mismatched_count_type() {
        let mut indexer = OffsetIndexer::new(2, CountType::Float64);
        let result = indexer.push(&table(vec![0], vec![1]));
        assert!(matches!(result, Err(StoreError::CountTypeMismatch { .. })));
    }
}
