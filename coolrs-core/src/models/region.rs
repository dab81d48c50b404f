use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::RegionParseError;
use crate::models::Bin;

///
/// A genomic region selector: a whole chromosome (`chr1`) or a slice of one
/// (`chr1:1,000,000-2,000,000`).
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct GenomicRegion {
    pub chr: String,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl GenomicRegion {
    pub fn chromosome(chr: impl Into<String>) -> Self {
        GenomicRegion {
            chr: chr.into(),
            start: None,
            end: None,
        }
    }

    ///
    /// Whether a bin lies (at least partially) inside this region
    ///
    pub fn overlaps(&self, bin: &Bin) -> bool {
        bin.chr == self.chr
            && self.start.is_none_or(|start| bin.end > start)
            && self.end.is_none_or(|end| bin.start < end)
    }
}

fn parse_coordinate(region: &str, coordinate: &str) -> Result<u64, RegionParseError> {
    let cleaned: String = coordinate
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    cleaned
        .parse::<u64>()
        .map_err(|_| RegionParseError::InvalidCoordinate {
            region: region.to_string(),
            coordinate: coordinate.to_string(),
        })
}

impl FromStr for GenomicRegion {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RegionParseError::Empty);
        }

        let (chr, range) = match s.split_once(':') {
            Some((chr, range)) => (chr, Some(range)),
            None => (s, None),
        };

        if chr.is_empty() || chr.chars().any(char::is_whitespace) {
            return Err(RegionParseError::InvalidFormat(s.to_string()));
        }

        let Some(range) = range else {
            return Ok(GenomicRegion::chromosome(chr));
        };

        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| RegionParseError::InvalidFormat(s.to_string()))?;
        let start = parse_coordinate(s, start)?;
        let end = parse_coordinate(s, end)?;

        if start >= end {
            return Err(RegionParseError::EmptyRange(s.to_string()));
        }

        Ok(GenomicRegion {
            chr: chr.to_string(),
            start: Some(start),
            end: Some(end),
        })
    }
}

impl Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{}:{}-{}", self.chr, start, end),
            _ => write!(f, "{}", self.chr),
        }
    }
}
