use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sprs::CsMat;

use crate::error::{CoolError, Result};
use crate::matrix::{ContactMatrix, filter_map_entries};

///
/// How a correction factor pair `f[i] * f[j]` is combined with a raw count
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionOperator {
    #[default]
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl CorrectionOperator {
    pub fn inverse(self) -> Self {
        match self {
            CorrectionOperator::Multiply => CorrectionOperator::Divide,
            CorrectionOperator::Divide => CorrectionOperator::Multiply,
        }
    }

    fn combine(self, value: f64, factor: f64) -> f64 {
        match self {
            CorrectionOperator::Multiply => value * factor,
            CorrectionOperator::Divide => value / factor,
        }
    }
}

impl Display for CorrectionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionOperator::Multiply => write!(f, "*"),
            CorrectionOperator::Divide => write!(f, "/"),
        }
    }
}

impl FromStr for CorrectionOperator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(CorrectionOperator::Multiply),
            "/" => Ok(CorrectionOperator::Divide),
            other => Err(format!("Unknown correction operator `{}`, expected `*` or `/`", other)),
        }
    }
}

///
/// Replace NaN factors (bins without a computed factor) by 1.0
///
pub fn sanitize_factors(factors: &[f64]) -> Vec<f64> {
    factors
        .iter()
        .map(|&f| if f.is_nan() { 1.0 } else { f })
        .collect()
}

///
/// Whether applying `factors` would leave every count untouched
///
pub fn is_identity(factors: &[f64]) -> bool {
    factors.iter().all(|&f| f == 1.0 || f.is_nan())
}

fn check_length(matrix: &ContactMatrix, factors: &[f64]) -> Result<()> {
    let (rows, _) = matrix.shape();
    if factors.len() != rows {
        return Err(CoolError::FactorLength {
            expected: rows,
            found: factors.len(),
        });
    }
    Ok(())
}

fn scaled(matrix: &ContactMatrix, factors: &[f64], operator: CorrectionOperator) -> CsMat<f64> {
    let factors = sanitize_factors(factors);
    filter_map_entries(&matrix.to_float(), |row, col, &value| {
        Some(operator.combine(value, factors[row] * factors[col]))
    })
}

///
/// Apply per-bin correction factors: every stored `(i, j)` becomes
/// `value op (f[i] * f[j])`. Identity factors return the matrix untouched.
///
/// # Arguments
/// - matrix: raw counts
/// - factors: one factor per bin, NaN meaning "no factor"
/// - operator: `*` or `/`
///
pub fn apply_correction(
    matrix: &ContactMatrix,
    factors: &[f64],
    operator: CorrectionOperator,
) -> Result<ContactMatrix> {
    check_length(matrix, factors)?;
    if is_identity(factors) {
        return Ok(matrix.clone());
    }

    let corrected = scaled(matrix, factors, operator);
    Ok(ContactMatrix::Float(filter_map_entries(&corrected, |_, _, &v| {
        (v != 0.0).then_some(v)
    })))
}

///
/// Undo [`apply_correction`]: apply the inverse operator, round half to even and
/// narrow to integer counts. Entries that round to zero are dropped.
/// Identity factors return the matrix untouched, without rounding.
///
pub fn revert_correction(
    matrix: &ContactMatrix,
    factors: &[f64],
    operator: CorrectionOperator,
) -> Result<ContactMatrix> {
    check_length(matrix, factors)?;
    if is_identity(factors) {
        return Ok(matrix.clone());
    }

    let raw = scaled(matrix, factors, operator.inverse());

    let mut overflow = None;
    let counts = filter_map_entries(&raw, |_, _, &value| {
        let rounded = value.round_ties_even();
        if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
            overflow.get_or_insert(value);
            return None;
        }
        let count = rounded as i64;
        (count != 0).then_some(count)
    });

    match overflow {
        Some(value) => Err(CoolError::CountOverflow(value)),
        None => Ok(ContactMatrix::Integer(counts)),
    }
}
