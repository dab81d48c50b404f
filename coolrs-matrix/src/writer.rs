use log::warn;

use coolrs_core::models::{CountType, Counts, PixelTable};

use crate::consts::{LARGE_WRITE_PARTITIONS, LARGE_WRITE_THRESHOLD};
use crate::error::{CoolError, Result};
use crate::matrix::{ContactMatrix, filter_map_entries, triplets};

///
/// Number of partitions a save of `nnz` pixels is split into
///
pub fn partition_count(nnz: usize) -> usize {
    if nnz > LARGE_WRITE_THRESHOLD {
        LARGE_WRITE_PARTITIONS
    } else {
        1
    }
}

///
/// Splits a pixel table into `parts` consecutive, near-equal partitions. The
/// first `len % parts` partitions carry one extra pixel. Partitions are cut
/// lazily as the store consumes them.
///
pub struct PixelPartitions {
    pixels: PixelTable,
    parts: usize,
    next: usize,
    offset: usize,
}

impl PixelPartitions {
    pub fn new(pixels: PixelTable, parts: usize) -> Self {
        PixelPartitions {
            pixels,
            parts: parts.max(1),
            next: 0,
            offset: 0,
        }
    }
}

impl Iterator for PixelPartitions {
    type Item = PixelTable;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.parts {
            return None;
        }

        let len = self.pixels.len();
        let size = len / self.parts + usize::from(self.next < len % self.parts);
        let partition = self.pixels.slice(self.offset..self.offset + size);

        self.next += 1;
        self.offset += size;
        Some(partition)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.parts - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelPartitions {}

///
/// Partition pixels for writing: one partition, or [`LARGE_WRITE_PARTITIONS`]
/// once there are more than [`LARGE_WRITE_THRESHOLD`] pixels.
///
pub fn split_pixels(pixels: PixelTable) -> PixelPartitions {
    let parts = partition_count(pixels.len());
    PixelPartitions::new(pixels, parts)
}

///
/// Pick the on-disk count encoding. An explicit request wins; otherwise
/// `enforce_integer` forces 32-bit counts, integer matrices use the narrowest
/// integer type holding every value, and float matrices are written as floats
/// with a warning.
///
pub fn resolve_count_type(
    matrix: &ContactMatrix,
    enforce_integer: bool,
    requested: Option<CountType>,
) -> CountType {
    if let Some(count_type) = requested {
        return count_type;
    }
    if enforce_integer {
        return CountType::Int32;
    }

    match matrix {
        ContactMatrix::Integer(m) => {
            let fits = m
                .data()
                .iter()
                .all(|&v| v >= i32::MIN as i64 && v <= i32::MAX as i64);
            if fits {
                CountType::Int32
            } else {
                CountType::Int64
            }
        }
        ContactMatrix::Float(_) => {
            warn!(
                "Writing {} counts. The matrix does not hold integer counts; use enforce_integer to round them",
                CountType::Float64
            );
            CountType::Float64
        }
    }
}

fn encode_integers(values: Vec<i64>, count_type: CountType) -> Result<Counts> {
    let counts = match count_type {
        CountType::Int32 => Counts::Int32(
            values
                .into_iter()
                .map(|v| i32::try_from(v).map_err(|_| CoolError::CountOverflow(v as f64)))
                .collect::<Result<Vec<_>>>()?,
        ),
        CountType::Int64 => Counts::Int64(values),
        CountType::Float64 => Counts::Float64(values.into_iter().map(|v| v as f64).collect()),
    };
    Ok(counts)
}

fn encode_floats(values: Vec<f64>, count_type: CountType) -> Result<Counts> {
    let counts = match count_type {
        CountType::Int32 => Counts::Int32(
            values
                .into_iter()
                .map(|v| {
                    if v.is_finite() && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
                        Ok(v as i32)
                    } else {
                        Err(CoolError::CountOverflow(v))
                    }
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        CountType::Int64 => Counts::Int64(
            values
                .into_iter()
                .map(|v| {
                    if v.is_finite() && v.abs() < i64::MAX as f64 {
                        Ok(v as i64)
                    } else {
                        Err(CoolError::CountOverflow(v))
                    }
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        CountType::Float64 => Counts::Float64(values),
    };
    Ok(counts)
}

///
/// Flatten the stored entries of `matrix` into a pixel table sorted by `bin1_id`,
/// encoding counts as `count_type`. Float values written as integers are rounded
/// half to even first and dropped if they round to zero.
///
pub fn pixel_table(matrix: &ContactMatrix, count_type: CountType) -> Result<PixelTable> {
    let (bin1, bin2, counts) = match matrix {
        ContactMatrix::Integer(m) => {
            let (bin1, bin2, values) = triplets(m);
            (bin1, bin2, encode_integers(values, count_type)?)
        }
        ContactMatrix::Float(m) if count_type.is_integer() => {
            let rounded = filter_map_entries(m, |_, _, &v| {
                let r = v.round_ties_even();
                (r != 0.0).then_some(r)
            });
            let (bin1, bin2, values) = triplets(&rounded);
            (bin1, bin2, encode_floats(values, count_type)?)
        }
        ContactMatrix::Float(m) => {
            let (bin1, bin2, values) = triplets(m);
            (bin1, bin2, encode_floats(values, count_type)?)
        }
    };

    Ok(PixelTable::new(bin1, bin2, counts)?)
}
