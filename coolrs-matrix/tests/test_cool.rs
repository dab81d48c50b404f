//! End-to-end load/save tests through both store implementations.

use coolrs_core::models::{Bin, CountType};
use coolrs_io::{MemoryStore, ParquetStore, Store, StoreError, StoreHandle};
use coolrs_matrix::correction::apply_correction;
use coolrs_matrix::{
    ContactMatrix, Cool, CoolConfig, CoolError, CorrectionOperator, LoadOptions, MatrixData,
    SaveOptions,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::*;
use sprs::TriMat;
use tempfile::{TempDir, tempdir};

/// 20 bins on chr1 followed by 10 bins on chr2
fn genome_bins() -> Vec<Bin> {
    let chr1 = (0..20u64).map(|i| Bin::new("chr1", i * 1_000, (i + 1) * 1_000));
    let chr2 = (0..10u64).map(|i| Bin::new("chr2", i * 1_000, (i + 1) * 1_000));
    chr1.chain(chr2).collect()
}

/// A symmetric integer matrix with a few empty bins
#[fixture]
fn data() -> MatrixData {
    let bins = genome_bins();
    let n = bins.len();
    let empty = [3, 17, 25];
    let mut rng = StdRng::seed_from_u64(2024);

    let mut tri = TriMat::new((n, n));
    for row in 0..n {
        for col in row..n {
            if empty.contains(&row) || empty.contains(&col) || !rng.random_bool(0.4) {
                continue;
            }
            let count = rng.random_range(1..200i64);
            tri.add_triplet(row, col, count);
            if row != col {
                tri.add_triplet(col, row, count);
            }
        }
    }

    MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins)
}

#[fixture]
fn workdir() -> TempDir {
    tempdir().unwrap()
}

fn uri_in(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

#[rstest]
fn test_round_trip_with_identity_factors(data: MatrixData, workdir: TempDir) {
    let uri = uri_in(&workdir, "identity.cool");
    let data = data.with_correction_factors(vec![1.0; 30]);

    let mut store = ParquetStore::new();
    let cool = Cool::new(&uri);
    cool.save(&mut store, &data, &uri, &SaveOptions::default())
        .unwrap();

    let loaded = cool.load(&store, &LoadOptions::default()).unwrap();

    assert!(loaded.matrix.is_integer());
    assert_eq!(loaded.matrix, data.matrix);
    assert_eq!(loaded.bins, data.bins);
    assert_eq!(loaded.correction_factors, Some(vec![1.0; 30]));
}

#[rstest]
fn test_corrected_matrix_round_trip(data: MatrixData, workdir: TempDir) {
    let uri = uri_in(&workdir, "balanced.cool");
    let factors: Vec<f64> = (0..30).map(|i| 0.5 + (i % 7) as f64 * 0.25).collect();

    let mut store = ParquetStore::new();
    let cool = Cool::new(&uri);
    let balanced = MatrixData {
        matrix: apply_correction(&data.matrix, &factors, CorrectionOperator::Multiply).unwrap(),
        ..data.clone()
    }
    .with_correction_factors(factors.clone());

    cool.save(&mut store, &balanced, &uri, &SaveOptions::default())
        .unwrap();

    let raw = cool
        .load(&store, &LoadOptions::default().without_correction())
        .unwrap();
    assert_eq!(raw.matrix, data.matrix);

    let loaded = cool.load(&store, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.correction_factors, Some(factors));
    for row in 0..30 {
        for col in 0..30 {
            let expected = balanced.matrix.get(row, col);
            let found = loaded.matrix.get(row, col);
            match (expected, found) {
                (Some(e), Some(f)) => assert!((e - f).abs() < 1e-9, "({}, {})", row, col),
                (e, f) => assert_eq!(e, f, "({}, {})", row, col),
            }
        }
    }
}

#[rstest]
fn test_load_save_load_from_disk(workdir: TempDir) {
    // bin 0 has contacts to bins 1 and 3 but no diagonal entry, bin 4 is empty
    let mut tri = TriMat::new((5, 5));
    for &(row, col, count) in &[(0, 1, 4i64), (0, 3, 2), (1, 2, 3), (2, 2, 5)] {
        tri.add_triplet(row, col, count);
        if row != col {
            tri.add_triplet(col, row, count);
        }
    }
    let bins: Vec<Bin> = (0..5u64)
        .map(|i| Bin::new("chr1", i * 1_000, (i + 1) * 1_000))
        .collect();
    let data = MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins)
        .with_correction_factors(vec![1.0, 2.0, 1.0, 0.5, f64::NAN]);

    let source = uri_in(&workdir, "source.cool");
    let copy = uri_in(&workdir, "copy.cool");
    let mut store = ParquetStore::new();
    let balanced = MatrixData {
        matrix: apply_correction(
            &data.matrix,
            &[1.0, 2.0, 1.0, 0.5, 1.0],
            CorrectionOperator::Multiply,
        )
        .unwrap(),
        ..data.clone()
    };
    Cool::new(&source)
        .save(&mut store, &balanced, &source, &SaveOptions::default())
        .unwrap();

    let first = Cool::new(&source)
        .load(&store, &LoadOptions::default())
        .unwrap();
    assert_eq!(first.missing_bins, Some(vec![4]));
    assert_eq!(first.matrix.get(0, 1), Some(8.0));
    assert_eq!(first.matrix.get(3, 0), Some(1.0));

    Cool::new(&source)
        .save(&mut store, &first, &copy, &SaveOptions::default())
        .unwrap();
    let second = Cool::new(&copy)
        .load(&store, &LoadOptions::default())
        .unwrap();

    assert_eq!(second, first);

    let raw = Cool::new(&copy)
        .load(&store, &LoadOptions::default().without_correction())
        .unwrap();
    assert_eq!(raw.matrix, data.matrix);
}

#[rstest]
fn test_missing_bins_are_not_written(data: MatrixData, workdir: TempDir) {
    let uri = uri_in(&workdir, "zeroed.cool");
    let data = data.with_missing_bins(vec![2, 9, 40]);

    let mut store = ParquetStore::new();
    Cool::new(&uri)
        .save(&mut store, &data, &uri, &SaveOptions::default())
        .unwrap();

    let handle = store.open(&uri).unwrap();
    let pixels = handle.pixel_rows(0, 30).unwrap();
    assert!(!pixels.is_empty());
    for (bin1, bin2) in pixels.bin1.iter().zip(&pixels.bin2) {
        assert!(![2, 9].contains(bin1), "bin1 {}", bin1);
        assert!(![2, 9].contains(bin2), "bin2 {}", bin2);
        assert!(bin1 <= bin2);
    }

    let loaded = Cool::new(&uri).load(&store, &LoadOptions::default()).unwrap();
    let missing = loaded.missing_bins.unwrap();
    for bin in [2, 3, 9, 17, 25] {
        assert!(missing.contains(&bin), "bin {} should be missing", bin);
    }
}

#[rstest]
fn test_region_load(data: MatrixData, workdir: TempDir) {
    let uri = uri_in(&workdir, "regions.cool");
    let factors: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
    let data = data.with_correction_factors(factors.clone());

    let mut store = ParquetStore::new();
    let cool = Cool::new(&uri);
    cool.save(
        &mut store,
        &data,
        &uri,
        &SaveOptions {
            apply_correction: false,
            ..SaveOptions::default()
        },
    )
    .unwrap();

    // without a saved weight column nothing is applied
    let options = LoadOptions::default().with_region("chr2");
    let loaded = cool.load(&store, &options).unwrap();

    assert_eq!(loaded.matrix.shape(), (10, 10));
    assert_eq!(loaded.bins, data.bins[20..].to_vec());
    assert_eq!(loaded.correction_factors, None);
    for row in 0..10 {
        for col in 0..10 {
            assert_eq!(
                loaded.matrix.get(row, col),
                data.matrix.get(row + 20, col + 20)
            );
        }
    }

    let partial = cool
        .load(&store, &LoadOptions::default().with_region("chr1:5,000-8,000"))
        .unwrap();
    assert_eq!(partial.matrix.shape(), (3, 3));
    assert_eq!(partial.bins[0], Bin::new("chr1", 5_000, 6_000));
}

#[rstest]
fn test_bad_region_requests(data: MatrixData, workdir: TempDir) {
    let uri = uri_in(&workdir, "bad.cool");
    let mut store = ParquetStore::new();
    let cool = Cool::new(&uri);
    cool.save(&mut store, &data, &uri, &SaveOptions::default())
        .unwrap();

    let two = LoadOptions::default().with_region("chr1").with_region("chr2");
    assert!(matches!(
        cool.load(&store, &two),
        Err(CoolError::MultipleRegions(2))
    ));

    let malformed = LoadOptions::default().with_region("chr1:abc-10");
    assert!(matches!(
        cool.load(&store, &malformed),
        Err(CoolError::Region(_))
    ));

    let unknown = LoadOptions::default().with_region("chrX");
    assert!(matches!(
        cool.load(&store, &unknown),
        Err(CoolError::Store(StoreError::UnknownRegion(_)))
    ));
}

#[rstest]
fn test_open_error_lists_available_nodes(data: MatrixData, workdir: TempDir) {
    let path = uri_in(&workdir, "matrix.mcool");
    let mut store = ParquetStore::new();
    let cool = Cool::new(&path);
    for resolution in ["1000", "5000"] {
        let uri = format!("{}::/resolutions/{}", path, resolution);
        cool.save(&mut store, &data, &uri, &SaveOptions::default())
            .unwrap();
    }

    let missing = Cool::new(format!("{}::/resolutions/250", path));
    let err = missing.load(&store, &LoadOptions::default()).unwrap_err();
    match err {
        CoolError::Store(StoreError::Open { uri, available }) => {
            assert!(uri.ends_with("::/resolutions/250"));
            assert_eq!(
                available,
                Some(vec![
                    "/resolutions/1000".to_string(),
                    "/resolutions/5000".to_string()
                ])
            );
        }
        other => panic!("unexpected error: {}", other),
    }

    let found = Cool::new(format!("{}::/resolutions/5000", path))
        .load(&store, &LoadOptions::default())
        .unwrap();
    assert_eq!(found.matrix, data.matrix);
}

#[rstest]
#[case(Some(1))]
#[case(Some(4))]
#[case(Some(29))]
#[case(Some(1_000))]
fn test_chunk_size_has_no_effect(data: MatrixData, #[case] chunk_size: Option<usize>) {
    let mut store = MemoryStore::new();
    Cool::new("m.cool")
        .save(&mut store, &data, "m.cool", &SaveOptions::default())
        .unwrap();

    let config = CoolConfig {
        chunk_size,
        ..CoolConfig::default()
    };
    let chunked = Cool::with_config("m.cool", config)
        .load(&store, &LoadOptions::default())
        .unwrap();
    let default = Cool::new("m.cool")
        .load(&store, &LoadOptions::default())
        .unwrap();

    assert_eq!(chunked, default);
}

#[rstest]
fn test_enforce_integer_rounds_float_counts(data: MatrixData) {
    let halves = MatrixData {
        matrix: ContactMatrix::Float(data.matrix.to_float().map(|v| v + 0.4)),
        ..data.clone()
    };

    let mut store = MemoryStore::new();
    let config = CoolConfig {
        enforce_integer: true,
        ..CoolConfig::default()
    };
    let info = Cool::with_config("m.cool", config)
        .save(&mut store, &halves, "m.cool", &SaveOptions::default())
        .unwrap();
    assert_eq!(info.count_type, CountType::Int32);

    let loaded = Cool::new("m.cool")
        .load(&store, &LoadOptions::default())
        .unwrap();
    assert_eq!(loaded.matrix, data.matrix);

    let info = Cool::new("f.cool")
        .save(&mut store, &halves, "f.cool", &SaveOptions::default())
        .unwrap();
    assert_eq!(info.count_type, CountType::Float64);
}

#[rstest]
fn test_large_save_is_partitioned() {
    let n = 1_600;
    let bins: Vec<Bin> = (0..n as u64)
        .map(|i| Bin::new("chr1", i * 10, (i + 1) * 10))
        .collect();

    let mut tri = TriMat::with_capacity((n, n), n * (n + 1) / 2);
    for row in 0..n {
        for col in row..n {
            tri.add_triplet(row, col, 1i64);
        }
    }
    let data = MatrixData::new(ContactMatrix::Integer(tri.to_csr()), bins);

    let mut store = MemoryStore::new();
    let info = Cool::new("big.cool")
        .save(&mut store, &data, "big.cool", &SaveOptions::default())
        .unwrap();
    assert_eq!(info.nonzero_count, 1_280_800);

    let handle = store.open("big.cool").unwrap();
    let sizes = handle.partition_sizes();
    assert_eq!(sizes.len(), 10_000);
    assert_eq!(sizes.iter().sum::<usize>(), 1_280_800);
    assert!(sizes[..800].iter().all(|&s| s == 129));
    assert!(sizes[800..].iter().all(|&s| s == 128));
}
