use log::{Level, debug, info, log_enabled};

use coolrs_core::models::{Bin, BinTable, GenomicRegion};
use coolrs_io::{CreateOptions, StorageMode, Store, StoreHandle, StoreInfo};

use crate::config::{CoolConfig, LoadOptions, SaveOptions};
use crate::correction::{apply_correction, revert_correction, sanitize_factors};
use crate::error::{CoolError, Result};
use crate::matrix::ContactMatrix;
use crate::missing::{MissingBinComparison, compare_missing_bins, missing_bins, zero_missing_bins};
use crate::reader::{read_matrix, read_region};
use crate::writer::{pixel_table, resolve_count_type, split_pixels};

///
/// A contact matrix held in memory together with everything needed to write it
/// back: its bins, the bins without data and the correction factors.
///
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixData {
    pub matrix: ContactMatrix,
    pub bins: Vec<Bin>,
    pub missing_bins: Option<Vec<usize>>,
    /// Never computed for this format
    pub distance_counts: Option<Vec<f64>>,
    pub correction_factors: Option<Vec<f64>>,
}

impl MatrixData {
    pub fn new(matrix: ContactMatrix, bins: Vec<Bin>) -> Self {
        MatrixData {
            matrix,
            bins,
            missing_bins: None,
            distance_counts: None,
            correction_factors: None,
        }
    }

    pub fn with_missing_bins(mut self, missing_bins: Vec<usize>) -> Self {
        self.missing_bins = Some(missing_bins);
        self
    }

    pub fn with_correction_factors(mut self, factors: Vec<f64>) -> Self {
        self.correction_factors = Some(factors);
        self
    }
}

///
/// A contact matrix file addressed by a store uri (`path::/node`)
///
#[derive(Debug, Clone)]
pub struct Cool {
    pub uri: String,
    pub config: CoolConfig,
}

fn parse_single_region(regions: &[String]) -> Result<Option<GenomicRegion>> {
    match regions {
        [] => Ok(None),
        [region] => Ok(Some(region.parse()?)),
        _ => Err(CoolError::MultipleRegions(regions.len())),
    }
}

impl Cool {
    pub fn new(uri: impl Into<String>) -> Self {
        Cool {
            uri: uri.into(),
            config: CoolConfig::default(),
        }
    }

    pub fn with_config(uri: impl Into<String>, config: CoolConfig) -> Self {
        Cool {
            uri: uri.into(),
            config,
        }
    }

    ///
    /// Names of the bin table columns of this file
    ///
    pub fn bin_columns<S: Store>(&self, store: &S) -> Result<Vec<String>> {
        let handle = store.open(&self.uri)?;
        Ok(handle.bin_columns()?)
    }

    pub fn info<S: Store>(&self, store: &S) -> Result<StoreInfo> {
        let handle = store.open(&self.uri)?;
        Ok(handle.info().clone())
    }

    ///
    /// Derive the missing bins of the stored matrix both ways and report where
    /// the two derivations disagree. Counts are read without correction.
    ///
    pub fn missing_bin_report<S: Store>(&self, store: &S) -> Result<Option<MissingBinComparison>> {
        let handle = store.open(&self.uri)?;
        let matrix = self.read_symmetric(&handle, None)?;
        Ok(compare_missing_bins(&matrix))
    }

    ///
    /// Assemble the stored pixels and mirror upper-triangle storage, so callers
    /// always see the full symmetric matrix.
    ///
    fn read_symmetric<H: StoreHandle>(
        &self,
        handle: &H,
        region: Option<&GenomicRegion>,
    ) -> Result<ContactMatrix> {
        let matrix = match region {
            Some(region) => read_region(handle, region)?,
            None => read_matrix(handle, self.config.chunk_size)?,
        }
        .eliminate_zeros();

        Ok(match handle.info().storage_mode {
            StorageMode::SymmetricUpper => matrix.fill_lower_triangle(),
            StorageMode::Square => matrix,
        })
    }

    ///
    /// Read the matrix, or the block of one region, into memory.
    ///
    /// Counts are multiplied by the correction column when `apply_correction` is
    /// set and the column exists; the factors used are returned alongside. Upper
    /// triangle storage is mirrored into the full symmetric matrix. A region load
    /// indexes bins relative to the first bin of the region.
    ///
    pub fn load<S: Store>(&self, store: &S, options: &LoadOptions) -> Result<MatrixData> {
        debug!("Load in cool format from {}", self.uri);
        let region = parse_single_region(&options.regions)?;

        let handle = store.open(&self.uri)?;
        let bins = handle.bins(region.as_ref())?;

        let matrix = self.read_symmetric(&handle, region.as_ref())?;

        let correction_factors = match bins.column(&self.config.correction_column) {
            Some(factors) if options.apply_correction => Some(sanitize_factors(factors)),
            _ => None,
        };

        let matrix = match &correction_factors {
            Some(factors) => {
                debug!("Apply correction factors");
                apply_correction(&matrix, factors, self.config.correction_operator)?
            }
            None => matrix,
        };

        let missing_bins = missing_bins(&matrix, self.config.missing_bins);
        if log_enabled!(Level::Debug) {
            if let Some(comparison) = compare_missing_bins(&matrix) {
                debug!(
                    "Missing bins: {} by index difference, {} by occupancy, agree: {}",
                    comparison.index_difference.len(),
                    comparison.occupancy.len(),
                    comparison.agree()
                );
            }
        }

        Ok(MatrixData {
            matrix,
            bins: bins.bins,
            missing_bins,
            distance_counts: None,
            correction_factors,
        })
    }

    ///
    /// Write `data` to `uri`, replacing any node already there. The held data is
    /// not modified.
    ///
    /// The stages run in this order: missing bins are zeroed, the upper triangle
    /// is kept when `symmetric`, correction factors are reverted out of the counts
    /// (and stored as the correction column) when `apply_correction`, and counts
    /// are encoded and written in partitions.
    ///
    pub fn save<S: Store>(
        &self,
        store: &mut S,
        data: &MatrixData,
        uri: &str,
        options: &SaveOptions,
    ) -> Result<StoreInfo> {
        debug!("Save in cool format to {}", uri);

        let (rows, cols) = data.matrix.shape();
        if rows != data.bins.len() || cols != data.bins.len() {
            return Err(CoolError::ShapeMismatch {
                rows,
                cols,
                bins: data.bins.len(),
            });
        }

        let matrix = zero_missing_bins(&data.matrix, data.missing_bins.as_deref());
        let matrix = if options.symmetric {
            matrix.upper_triangle()
        } else {
            matrix
        };

        let mut bins = BinTable::new(data.bins.clone())?;
        let factors = data
            .correction_factors
            .as_deref()
            .filter(|_| options.apply_correction);

        let matrix = match factors {
            Some(factors) => {
                bins = bins.with_column(&self.config.correction_column, sanitize_factors(factors))?;
                info!("Reverting correction factors on matrix...");
                revert_correction(&matrix, factors, self.config.correction_operator)?
            }
            None => matrix,
        };

        let count_type =
            resolve_count_type(&matrix, self.config.enforce_integer, options.count_type);
        let pixels = pixel_table(&matrix, count_type)?;
        let partitions = split_pixels(pixels);
        debug!(
            "Writing {} pixels as {} in {} partitions",
            matrix.nnz(),
            count_type,
            partitions.len()
        );

        let create = CreateOptions {
            truncate_existing: true,
            storage_mode: if options.symmetric {
                StorageMode::SymmetricUpper
            } else {
                StorageMode::Square
            },
            count_type,
        };
        Ok(store.create(uri, &bins, partitions, &create)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::correction::CorrectionOperator;
    use coolrs_io::MemoryStore;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use sprs::TriMat;

    fn bins(n: u64) -> Vec<Bin> {
        (0..n).map(|i| Bin::new("chr1", i * 100, (i + 1) * 100)).collect()
    }

    #[fixture]
    fn data() -> MatrixData {
        let mut tri = TriMat::new((4, 4));
        tri.add_triplet(0, 1, 4i64);
        tri.add_triplet(1, 0, 4);
        tri.add_triplet(1, 2, 3);
        tri.add_triplet(2, 1, 3);
        tri.add_triplet(2, 3, 6);
        tri.add_triplet(3, 2, 6);
        MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins(4))
    }

    #[rstest]
    fn test_multiple_regions_fail_before_opening() {
        let store = MemoryStore::new();
        let options = LoadOptions::default().with_region("chr1").with_region("chr2");

        let result = Cool::new("missing.cool").load(&store, &options);
        assert!(matches!(result, Err(CoolError::MultipleRegions(2))));
    }

    #[rstest]
    fn test_save_keeps_upper_triangle(data: MatrixData) {
        let mut store = MemoryStore::new();
        let cool = Cool::new("m.cool");
        let info = cool
            .save(&mut store, &data, "m.cool", &SaveOptions::default())
            .unwrap();

        assert_eq!(info.nonzero_count, 3);
        assert_eq!(info.storage_mode, StorageMode::SymmetricUpper);

        let loaded = cool.load(&store, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.matrix, data.matrix);
        assert_eq!(loaded.correction_factors, None);
    }

    #[rstest]
    fn test_save_asymmetric_keeps_both_triangles(data: MatrixData) {
        let mut store = MemoryStore::new();
        let options = SaveOptions {
            symmetric: false,
            ..SaveOptions::default()
        };
        let info = Cool::new("m.cool")
            .save(&mut store, &data, "m.cool", &options)
            .unwrap();

        assert_eq!(info.nonzero_count, 6);
        assert_eq!(info.storage_mode, StorageMode::Square);
    }

    #[rstest]
    fn test_correction_round_trip(data: MatrixData) {
        let factors = vec![1.0, 2.0, 1.0, 0.5];
        let cool = Cool::new("m.cool");
        let corrected = MatrixData {
            matrix: apply_correction(&data.matrix, &factors, CorrectionOperator::Multiply).unwrap(),
            ..data.clone()
        }
        .with_correction_factors(factors.clone());

        let mut store = MemoryStore::new();
        cool.save(&mut store, &corrected, "m.cool", &SaveOptions::default())
            .unwrap();
        assert_eq!(
            cool.bin_columns(&store).unwrap(),
            vec!["chrom", "start", "end", "weight"]
        );

        let raw = cool
            .load(&store, &LoadOptions::default().without_correction())
            .unwrap();
        assert_eq!(raw.matrix, data.matrix);
        assert_eq!(raw.correction_factors, None);

        let loaded = cool.load(&store, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.correction_factors, Some(factors));
        assert_eq!(loaded.matrix.get(0, 1), Some(8.0));
        assert_eq!(loaded.matrix.get(1, 2), Some(6.0));
        assert_eq!(loaded.matrix.get(2, 3), Some(3.0));
        assert_eq!(loaded.matrix.get(3, 2), Some(3.0));
    }

    #[rstest]
    fn test_save_does_not_modify_data(data: MatrixData) {
        let data = data
            .with_missing_bins(vec![3])
            .with_correction_factors(vec![1.0, 2.0, f64::NAN, 1.0]);
        let before = data.matrix.clone();

        let mut store = MemoryStore::new();
        Cool::new("m.cool")
            .save(&mut store, &data, "m.cool", &SaveOptions::default())
            .unwrap();

        assert_eq!(data.matrix, before);
        assert_eq!(data.missing_bins, Some(vec![3]));
    }

    #[rstest]
    fn test_shape_mismatch(data: MatrixData) {
        let data = MatrixData {
            bins: bins(3),
            ..data
        };
        let mut store = MemoryStore::new();
        let result = Cool::new("m.cool").save(&mut store, &data, "m.cool", &SaveOptions::default());
        assert!(matches!(
            result,
            Err(CoolError::ShapeMismatch {
                rows: 4,
                cols: 4,
                bins: 3
            })
        ));
    }

    #[rstest]
    fn test_load_reports_missing_bins() {
        // bins 4 and 5 are empty, bin 0 has no diagonal and only contacts bin 1
        let mut tri = TriMat::new((6, 6));
        for &(r, c, v) in &[(0, 1, 4i64), (1, 0, 4), (1, 2, 3), (2, 1, 3), (2, 3, 6), (3, 2, 6)] {
            tri.add_triplet(r, c, v);
        }
        let data = MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins(6));

        let mut store = MemoryStore::new();
        let cool = Cool::new("m.cool");
        cool.save(&mut store, &data, "m.cool", &SaveOptions::default())
            .unwrap();

        let loaded = cool.load(&store, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.missing_bins, Some(vec![4, 5]));
        assert_eq!(loaded.distance_counts, None);
        assert_eq!(loaded.matrix.get(1, 0), Some(4.0));

        let report = cool.missing_bin_report(&store).unwrap().unwrap();
        assert!(report.agree());
        assert_eq!(report.occupancy, vec![4, 5]);
    }

    #[rstest]
    fn test_load_save_cycle_keeps_contacts() {
        let mut tri = TriMat::new((3, 3));
        for &(r, c, v) in &[(0, 1, 4i64), (1, 0, 4), (1, 2, 3), (2, 1, 3)] {
            tri.add_triplet(r, c, v);
        }
        let data = MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins(3));

        let mut store = MemoryStore::new();
        let cool = Cool::new("a.cool");
        cool.save(&mut store, &data, "a.cool", &SaveOptions::default())
            .unwrap();

        let first = cool.load(&store, &LoadOptions::default()).unwrap();
        assert_eq!(first.missing_bins, Some(vec![]));

        cool.save(&mut store, &first, "b.cool", &SaveOptions::default())
            .unwrap();
        let second = Cool::new("b.cool")
            .load(&store, &LoadOptions::default())
            .unwrap();

        assert_eq!(second.matrix.get(0, 1), Some(4.0));
        assert_eq!(second, first);
    }

    #[rstest]
    fn test_square_storage_is_not_mirrored() {
        let mut tri = TriMat::new((2, 2));
        tri.add_triplet(0, 1, 5i64);
        let data = MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins(2));

        let mut store = MemoryStore::new();
        let options = SaveOptions {
            symmetric: false,
            ..SaveOptions::default()
        };
        let cool = Cool::new("s.cool");
        cool.save(&mut store, &data, "s.cool", &options).unwrap();

        let loaded = cool.load(&store, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.matrix, data.matrix);
        assert_eq!(loaded.matrix.get(1, 0), None);
    }
}
