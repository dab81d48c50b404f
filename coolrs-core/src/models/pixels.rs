use std::fmt::{self, Display};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::TableError;

///
/// Storage type of the `count` column of a pixel table
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountType {
    #[default]
    Int32,
    Int64,
    Float64,
}

impl CountType {
    pub fn is_integer(&self) -> bool {
        matches!(self, CountType::Int32 | CountType::Int64)
    }
}

impl Display for CountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CountType::Int32 => "int32",
            CountType::Int64 => "int64",
            CountType::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

///
/// The `count` column of a pixel table, typed by its on-disk encoding
///
#[derive(Debug, Clone, PartialEq)]
pub enum Counts {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
}

impl Counts {
    pub fn empty(count_type: CountType) -> Self {
        match count_type {
            CountType::Int32 => Counts::Int32(Vec::new()),
            CountType::Int64 => Counts::Int64(Vec::new()),
            CountType::Float64 => Counts::Float64(Vec::new()),
        }
    }

    pub fn count_type(&self) -> CountType {
        match self {
            Counts::Int32(_) => CountType::Int32,
            Counts::Int64(_) => CountType::Int64,
            Counts::Float64(_) => CountType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Counts::Int32(v) => v.len(),
            Counts::Int64(v) => v.len(),
            Counts::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    ///
    /// Value at `index` as a float, regardless of the encoding
    ///
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Counts::Int32(v) => v.get(index).map(|&c| c as f64),
            Counts::Int64(v) => v.get(index).map(|&c| c as f64),
            Counts::Float64(v) => v.get(index).copied(),
        }
    }

    ///
    /// Value at `index` cast to an integer. Float counts are truncated
    /// towards zero, matching a plain numeric cast.
    ///
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        match self {
            Counts::Int32(v) => v.get(index).map(|&c| c as i64),
            Counts::Int64(v) => v.get(index).copied(),
            Counts::Float64(v) => v.get(index).map(|&c| c as i64),
        }
    }

    fn slice(&self, range: Range<usize>) -> Counts {
        match self {
            Counts::Int32(v) => Counts::Int32(v[range].to_vec()),
            Counts::Int64(v) => Counts::Int64(v[range].to_vec()),
            Counts::Float64(v) => Counts::Float64(v[range].to_vec()),
        }
    }

    fn select(&self, keep: &[usize]) -> Counts {
        match self {
            Counts::Int32(v) => Counts::Int32(keep.iter().map(|&i| v[i]).collect()),
            Counts::Int64(v) => Counts::Int64(keep.iter().map(|&i| v[i]).collect()),
            Counts::Float64(v) => Counts::Float64(keep.iter().map(|&i| v[i]).collect()),
        }
    }

    fn append(&mut self, other: Counts) -> Result<(), TableError> {
        match (self, other) {
            (Counts::Int32(a), Counts::Int32(b)) => a.extend(b),
            (Counts::Int64(a), Counts::Int64(b)) => a.extend(b),
            (Counts::Float64(a), Counts::Float64(b)) => a.extend(b),
            (this, other) => {
                return Err(TableError::CountTypeMismatch {
                    expected: this.count_type(),
                    found: other.count_type(),
                });
            }
        }
        Ok(())
    }
}

///
/// A columnar list of matrix pixels: `(bin1_id, bin2_id, count)`
///
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTable {
    pub bin1: Vec<u64>,
    pub bin2: Vec<u64>,
    pub counts: Counts,
}

impl PixelTable {
    pub fn new(bin1: Vec<u64>, bin2: Vec<u64>, counts: Counts) -> Result<Self, TableError> {
        if bin2.len() != bin1.len() {
            return Err(TableError::LengthMismatch {
                column: "bin2_id".to_string(),
                expected: bin1.len(),
                found: bin2.len(),
            });
        }
        if counts.len() != bin1.len() {
            return Err(TableError::LengthMismatch {
                column: "count".to_string(),
                expected: bin1.len(),
                found: counts.len(),
            });
        }

        Ok(PixelTable { bin1, bin2, counts })
    }

    pub fn empty(count_type: CountType) -> Self {
        PixelTable {
            bin1: Vec::new(),
            bin2: Vec::new(),
            counts: Counts::empty(count_type),
        }
    }

    pub fn len(&self) -> usize {
        self.bin1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin1.is_empty()
    }

    pub fn count_type(&self) -> CountType {
        self.counts.count_type()
    }

    ///
    /// Copy out the rows in `range` as a new table
    ///
    pub fn slice(&self, range: Range<usize>) -> PixelTable {
        PixelTable {
            bin1: self.bin1[range.clone()].to_vec(),
            bin2: self.bin2[range.clone()].to_vec(),
            counts: self.counts.slice(range),
        }
    }

    ///
    /// Keep only pixels whose two bins both fall in `bins`, re-indexed so that
    /// `bins.start` becomes bin 0.
    ///
    pub fn restrict_to(&self, bins: Range<usize>) -> PixelTable {
        let lo = bins.start as u64;
        let hi = bins.end as u64;

        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| {
                (lo..hi).contains(&self.bin1[i]) && (lo..hi).contains(&self.bin2[i])
            })
            .collect();

        PixelTable {
            bin1: keep.iter().map(|&i| self.bin1[i] - lo).collect(),
            bin2: keep.iter().map(|&i| self.bin2[i] - lo).collect(),
            counts: self.counts.select(&keep),
        }
    }

    ///
    /// Append another table with the same count encoding to this one
    ///
    pub fn append(&mut self, other: PixelTable) -> Result<(), TableError> {
        self.counts.append(other.counts)?;
        self.bin1.extend(other.bin1);
        self.bin2.extend(other.bin2);
        Ok(())
    }
}
