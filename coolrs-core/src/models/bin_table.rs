use std::collections::BTreeMap;
use std::ops::Range;

use fxhash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

use crate::errors::TableError;
use crate::models::{Bin, GenomicRegion};

pub const CHROM_COLUMN: &str = "chrom";
pub const START_COLUMN: &str = "start";
pub const END_COLUMN: &str = "end";

///
/// Name and length of one chromosome of a bin table
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChromInfo {
    pub name: String,
    pub length: u64,
}

///
/// BinTable struct, the ordered bins of a contact matrix plus any per-bin
/// float columns (e.g. the `weight` normalization vector).
///
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinTable {
    pub bins: Vec<Bin>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl BinTable {
    pub fn new(bins: Vec<Bin>) -> Result<Self, TableError> {
        if let Some((index, bin)) = bins.iter().enumerate().find(|(_, b)| b.start >= b.end) {
            return Err(TableError::InvalidBin {
                index,
                start: bin.start,
                end: bin.end,
            });
        }

        Ok(BinTable {
            bins,
            columns: BTreeMap::new(),
        })
    }

    ///
    /// Attach a per-bin float column, replacing any column of the same name
    ///
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self, TableError> {
        if values.len() != self.bins.len() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.bins.len(),
                found: values.len(),
            });
        }
        self.columns.insert(name.to_string(), values);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    ///
    /// All column names, the three interval columns first
    ///
    pub fn column_names(&self) -> Vec<String> {
        [CHROM_COLUMN, START_COLUMN, END_COLUMN]
            .iter()
            .map(|s| s.to_string())
            .chain(self.columns.keys().cloned())
            .collect()
    }

    ///
    /// Chromosomes in order of first appearance; the length of a chromosome is
    /// the largest bin end seen on it.
    ///
    pub fn chromosomes(&self) -> Vec<ChromInfo> {
        let mut order: Vec<ChromInfo> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::default();

        for bin in &self.bins {
            match seen.get(bin.chr.as_str()) {
                Some(&i) => order[i].length = order[i].length.max(bin.end),
                None => {
                    seen.insert(bin.chr.as_str(), order.len());
                    order.push(ChromInfo {
                        name: bin.chr.clone(),
                        length: bin.end,
                    });
                }
            }
        }

        order
    }

    ///
    /// Index range of the bins overlapping `region`, or `None` if no bin does.
    /// Bins of one chromosome are contiguous, so the overlap is one range.
    ///
    pub fn range_for(&self, region: &GenomicRegion) -> Option<Range<usize>> {
        let first = self.bins.iter().position(|b| region.overlaps(b))?;
        let len = self.bins[first..]
            .iter()
            .take_while(|b| region.overlaps(b))
            .count();
        Some(first..first + len)
    }

    ///
    /// Copy out the bins (and column values) in `range`
    ///
    pub fn slice(&self, range: Range<usize>) -> BinTable {
        BinTable {
            bins: self.bins[range.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v[range.clone()].to_vec()))
                .collect(),
        }
    }
}
