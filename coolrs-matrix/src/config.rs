use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coolrs_core::models::CountType;

use crate::consts::DEFAULT_CORRECTION_COLUMN;
use crate::correction::CorrectionOperator;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

///
/// How missing bins are derived from a loaded matrix
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingBinStrategy {
    /// Bins that never occur as a column index of a stored entry
    #[default]
    IndexDifference,
    /// Bins whose row and column are both empty
    Occupancy,
}

///
/// Per-file settings of a contact matrix: which bin column holds the
/// correction factors, how they are applied, and how counts are encoded.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CoolConfig {
    pub correction_column: String,
    pub correction_operator: CorrectionOperator,
    pub enforce_integer: bool,
    pub chunk_size: Option<usize>,
    pub missing_bins: MissingBinStrategy,
}

impl Default for CoolConfig {
    fn default() -> Self {
        CoolConfig {
            correction_column: DEFAULT_CORRECTION_COLUMN.to_string(),
            correction_operator: CorrectionOperator::default(),
            enforce_integer: false,
            chunk_size: None,
            missing_bins: MissingBinStrategy::default(),
        }
    }
}

impl TryFrom<&Path> for CoolConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let contents = read_to_string(path)?;
        let config: CoolConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Multiply the stored counts by the bin correction factors
    pub apply_correction: bool,
    /// Region filter; at most one region is supported
    pub regions: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            apply_correction: true,
            regions: Vec::new(),
        }
    }
}

impl LoadOptions {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.regions.push(region.into());
        self
    }

    pub fn without_correction(mut self) -> Self {
        self.apply_correction = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
    /// Store only the upper triangle
    pub symmetric: bool,
    /// Write the correction column and revert the factors out of the counts
    pub apply_correction: bool,
    /// Force a count encoding. `None` picks one from the matrix and config.
    pub count_type: Option<CountType>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            symmetric: true,
            apply_correction: true,
            count_type: None,
        }
    }
}
