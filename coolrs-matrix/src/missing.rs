use log::debug;
use serde::Serialize;

use crate::config::MissingBinStrategy;
use crate::matrix::{ContactMatrix, filter_map_entries};

///
/// Bins in `0..min(rows, cols)` that never occur as the column index of a stored
/// entry. `None` when the matrix has no bins at all.
///
pub fn missing_bins_from_indices(matrix: &ContactMatrix) -> Option<Vec<usize>> {
    let (rows, cols) = matrix.shape();
    let dim = rows.min(cols);
    if dim == 0 {
        return None;
    }

    let mut seen = vec![false; dim];
    for &col in matrix.indices() {
        if col < dim {
            seen[col] = true;
        }
    }

    Some(
        seen.iter()
            .enumerate()
            .filter_map(|(bin, &present)| (!present).then_some(bin))
            .collect(),
    )
}

///
/// Bins whose row and column both hold no entries. On a full symmetric matrix this
/// agrees with [`missing_bins_from_indices`]; on upper-triangle storage it is the
/// stricter of the two.
///
pub fn missing_bins_from_occupancy(matrix: &ContactMatrix) -> Option<Vec<usize>> {
    let (rows, cols) = matrix.shape();
    let dim = rows.min(cols);
    if dim == 0 {
        return None;
    }

    let mut occupied = vec![false; dim];
    for &col in matrix.indices() {
        if col < dim {
            occupied[col] = true;
        }
    }

    let row_lengths: Vec<usize> = match matrix {
        ContactMatrix::Integer(m) => m.outer_iterator().map(|row| row.nnz()).collect(),
        ContactMatrix::Float(m) => m.outer_iterator().map(|row| row.nnz()).collect(),
    };
    for (bin, &len) in row_lengths.iter().take(dim).enumerate() {
        if len > 0 {
            occupied[bin] = true;
        }
    }

    Some(
        occupied
            .iter()
            .enumerate()
            .filter_map(|(bin, &present)| (!present).then_some(bin))
            .collect(),
    )
}

pub fn missing_bins(matrix: &ContactMatrix, strategy: MissingBinStrategy) -> Option<Vec<usize>> {
    match strategy {
        MissingBinStrategy::IndexDifference => missing_bins_from_indices(matrix),
        MissingBinStrategy::Occupancy => missing_bins_from_occupancy(matrix),
    }
}

///
/// Side by side result of both missing-bin derivations
///
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct MissingBinComparison {
    pub index_difference: Vec<usize>,
    pub occupancy: Vec<usize>,
    /// Bins only the index difference reports, i.e. bins holding row entries but no column entries
    pub only_index_difference: Vec<usize>,
    pub only_occupancy: Vec<usize>,
}

impl MissingBinComparison {
    pub fn agree(&self) -> bool {
        self.only_index_difference.is_empty() && self.only_occupancy.is_empty()
    }
}

pub fn compare_missing_bins(matrix: &ContactMatrix) -> Option<MissingBinComparison> {
    let index_difference = missing_bins_from_indices(matrix)?;
    let occupancy = missing_bins_from_occupancy(matrix)?;

    let only_index_difference = index_difference
        .iter()
        .filter(|bin| occupancy.binary_search(*bin).is_err())
        .copied()
        .collect();
    let only_occupancy = occupancy
        .iter()
        .filter(|bin| index_difference.binary_search(*bin).is_err())
        .copied()
        .collect();

    Some(MissingBinComparison {
        index_difference,
        occupancy,
        only_index_difference,
        only_occupancy,
    })
}

///
/// Zero every row and column listed in `missing` and drop the entries that end up
/// zero. NaN values of a float matrix are zeroed as well. Indices at or beyond the
/// matrix dimension are ignored.
///
pub fn zero_missing_bins(matrix: &ContactMatrix, missing: Option<&[usize]>) -> ContactMatrix {
    let (rows, cols) = matrix.shape();
    let mut keep = vec![true; rows.max(cols)];
    let mut zeroed = 0;
    for &bin in missing.unwrap_or_default() {
        if bin < keep.len() && keep[bin] {
            keep[bin] = false;
            zeroed += 1;
        }
    }

    if zeroed > 0 {
        debug!("Zeroing {} missing bins", zeroed);
    }

    match matrix {
        ContactMatrix::Integer(m) => ContactMatrix::Integer(filter_map_entries(m, |r, c, &v| {
            (keep[r] && keep[c] && v != 0).then_some(v)
        })),
        ContactMatrix::Float(m) => ContactMatrix::Float(filter_map_entries(m, |r, c, &v| {
            (keep[r] && keep[c] && !v.is_nan() && v != 0.0).then_some(v)
        })),
    }
}
