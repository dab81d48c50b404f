use std::fmt::{self, Display};

///
/// Bin struct, one fixed genomic interval used as a row/column of a contact matrix
///
#[derive(PartialEq, Debug, Clone)]
pub struct Bin {
    pub chr: String,
    pub start: u64,
    pub end: u64,

    /// Interaction placeholder carried for layout symmetry with other matrix formats.
    /// It is always `1.0` and never used in computation.
    pub interactions: f64,
}

impl Bin {
    pub fn new(chr: impl Into<String>, start: u64, end: u64) -> Self {
        Bin {
            chr: chr.into(),
            start,
            end,
            interactions: 1.0,
        }
    }

    ///
    /// Get the width of the bin in base pairs
    ///
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}", self.chr, self.start, self.end)
    }
}

impl Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
