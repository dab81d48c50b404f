use num_traits::Num;
use sprs::{CsMat, TriMat};

///
/// A square contact matrix in CSR layout. Counts read from disk are integers;
/// anything that went through a correction is held as floats.
///
#[derive(Debug, Clone, PartialEq)]
pub enum ContactMatrix {
    Integer(CsMat<i64>),
    Float(CsMat<f64>),
}

///
/// Keep (and possibly transform) the entries of a CSR matrix that `f` maps to `Some`.
/// The result has the same shape and keeps the row-major entry order.
///
pub(crate) fn filter_map_entries<N, M, F>(matrix: &CsMat<N>, mut f: F) -> CsMat<M>
where
    F: FnMut(usize, usize, &N) -> Option<M>,
{
    let mut indptr = Vec::with_capacity(matrix.rows() + 1);
    let mut indices = Vec::with_capacity(matrix.nnz());
    let mut data = Vec::with_capacity(matrix.nnz());

    indptr.push(0);
    for (row, vec) in matrix.outer_iterator().enumerate() {
        for (col, value) in vec.iter() {
            if let Some(value) = f(row, col, value) {
                indices.push(col);
                data.push(value);
            }
        }
        indptr.push(indices.len());
    }

    CsMat::new(matrix.shape(), indptr, indices, data)
}

///
/// Row-major `(row, col, value)` columns of a CSR matrix
///
pub(crate) fn triplets<N: Copy>(matrix: &CsMat<N>) -> (Vec<u64>, Vec<u64>, Vec<N>) {
    let mut rows = Vec::with_capacity(matrix.nnz());
    let mut cols = Vec::with_capacity(matrix.nnz());
    let mut values = Vec::with_capacity(matrix.nnz());

    for (row, vec) in matrix.outer_iterator().enumerate() {
        for (col, &value) in vec.iter() {
            rows.push(row as u64);
            cols.push(col as u64);
            values.push(value);
        }
    }

    (rows, cols, values)
}

fn mirrored<N: Copy + Num>(matrix: &CsMat<N>) -> CsMat<N> {
    let mut tri = TriMat::with_capacity(matrix.shape(), 2 * matrix.nnz());
    for (row, vec) in matrix.outer_iterator().enumerate() {
        for (col, &value) in vec.iter() {
            tri.add_triplet(row, col, value);
            if row < col {
                tri.add_triplet(col, row, value);
            }
        }
    }
    tri.to_csr()
}

impl ContactMatrix {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            ContactMatrix::Integer(m) => m.shape(),
            ContactMatrix::Float(m) => m.shape(),
        }
    }

    pub fn nnz(&self) -> usize {
        match self {
            ContactMatrix::Integer(m) => m.nnz(),
            ContactMatrix::Float(m) => m.nnz(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ContactMatrix::Integer(_))
    }

    ///
    /// Value of cell `(row, col)` as stored, `None` for cells not in the matrix
    ///
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            ContactMatrix::Integer(m) => m.get(row, col).map(|&v| v as f64),
            ContactMatrix::Float(m) => m.get(row, col).copied(),
        }
    }

    ///
    /// Column indices of every stored entry, in row-major order
    ///
    pub fn indices(&self) -> &[usize] {
        match self {
            ContactMatrix::Integer(m) => m.indices(),
            ContactMatrix::Float(m) => m.indices(),
        }
    }

    ///
    /// Widen to float storage. Integer counts convert exactly.
    ///
    pub fn to_float(&self) -> CsMat<f64> {
        match self {
            ContactMatrix::Integer(m) => m.map(|&v| v as f64),
            ContactMatrix::Float(m) => m.clone(),
        }
    }

    ///
    /// Drop every entry whose value is exactly zero. NaN entries of a float matrix
    /// are set to zero first, so they are dropped too.
    ///
    pub fn eliminate_zeros(&self) -> ContactMatrix {
        match self {
            ContactMatrix::Integer(m) => {
                ContactMatrix::Integer(filter_map_entries(m, |_, _, &v| (v != 0).then_some(v)))
            }
            ContactMatrix::Float(m) => ContactMatrix::Float(filter_map_entries(m, |_, _, &v| {
                (!v.is_nan() && v != 0.0).then_some(v)
            })),
        }
    }

    ///
    /// Keep only the upper triangle (`row <= col`), dropping zero entries.
    ///
    pub fn upper_triangle(&self) -> ContactMatrix {
        match self {
            ContactMatrix::Integer(m) => ContactMatrix::Integer(filter_map_entries(m, |r, c, &v| {
                (r <= c && v != 0).then_some(v)
            })),
            ContactMatrix::Float(m) => ContactMatrix::Float(filter_map_entries(m, |r, c, &v| {
                (r <= c && v != 0.0).then_some(v)
            })),
        }
    }

    ///
    /// Expand upper-triangle storage into the full symmetric matrix by adding the
    /// transpose of the strict upper triangle. Entries already present below the
    /// diagonal are summed with their mirrored counterpart.
    ///
    pub fn fill_lower_triangle(&self) -> ContactMatrix {
        match self {
            ContactMatrix::Integer(m) => ContactMatrix::Integer(mirrored(m)),
            ContactMatrix::Float(m) => ContactMatrix::Float(mirrored(m)),
        }
    }
}

impl From<CsMat<i64>> for ContactMatrix {
    fn from(value: CsMat<i64>) -> Self {
        ContactMatrix::Integer(value)
    }
}

impl From<CsMat<f64>> for ContactMatrix {
    fn from(value: CsMat<f64>) -> Self {
        ContactMatrix::Float(value)
    }
}
