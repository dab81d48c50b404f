//! Directory-per-node matrix store on top of Apache Parquet.
//!
//! A node is a directory holding four files:
//!
//! - `info.json`: scalar metadata ([`StoreInfo`])
//! - `bins.parquet`: `chrom`, `start`, `end` and any float normalization columns
//! - `pixels.parquet`: `bin1_id`, `bin2_id`, `count`, sorted by `bin1_id`, one row group
//!   per written partition
//! - `indexes.parquet`: `bin1_offset`, so a block of rows can be read without
//!   decoding the rest of the pixel table
//!
//! Nodes may nest (`matrix.mcool/resolutions/10000`); they are addressed as
//! `matrix.mcool::/resolutions/10000`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::{
    ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder, RowSelection, RowSelector,
};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use coolrs_core::models::bin_table::{CHROM_COLUMN, END_COLUMN, START_COLUMN};
use coolrs_core::models::{Bin, BinTable, CountType, Counts, PixelTable};

use crate::consts::{
    BIN1_COLUMN, BIN1_OFFSET_COLUMN, BIN2_COLUMN, BINS_FILE, COUNT_COLUMN, INDEXES_FILE,
    INFO_FILE, PIXELS_FILE,
};
use crate::error::{Result, StoreError};
use crate::index::OffsetIndexer;
use crate::info::{CreateOptions, StoreInfo};
use crate::traits::{Store, StoreHandle, check_bin_range};
use crate::uri::StoreUri;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn node_dir(uri: &StoreUri) -> PathBuf {
    let mut dir = PathBuf::from(&uri.path);
    for part in uri.relative_node().split('/').filter(|p| !p.is_empty()) {
        dir.push(part);
    }
    dir
}

fn is_node(dir: &Path) -> bool {
    dir.join(INFO_FILE).is_file()
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open_reader(path: &Path, selection: Option<RowSelection>) -> Result<ParquetRecordBatchReader> {
    let file = File::open(path)?;
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    if let Some(selection) = selection {
        builder = builder.with_row_selection(selection);
    }
    Ok(builder.build()?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str, path: &Path) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::MissingColumn {
            column: name.to_string(),
            path: path.display().to_string(),
        })
}

fn typed_column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
    path: &Path,
) -> Result<&'a T> {
    let array = column(batch, name, path)?;
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| StoreError::ColumnType {
            column: name.to_string(),
            path: path.display().to_string(),
            found: array.data_type().to_string(),
        })
}

fn unsigned_values(array: &Int64Array) -> Vec<u64> {
    array.values().iter().map(|&v| v as u64).collect()
}

fn signed_array(values: &[u64]) -> Int64Array {
    Int64Array::from(values.iter().map(|&v| v as i64).collect::<Vec<i64>>())
}

fn count_data_type(count_type: CountType) -> DataType {
    match count_type {
        CountType::Int32 => DataType::Int32,
        CountType::Int64 => DataType::Int64,
        CountType::Float64 => DataType::Float64,
    }
}

fn pixel_schema(count_type: CountType) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(BIN1_COLUMN, DataType::Int64, false),
        Field::new(BIN2_COLUMN, DataType::Int64, false),
        Field::new(COUNT_COLUMN, count_data_type(count_type), false),
    ]))
}

fn counts_array(counts: Counts) -> ArrayRef {
    match counts {
        Counts::Int32(v) => Arc::new(Int32Array::from(v)),
        Counts::Int64(v) => Arc::new(Int64Array::from(v)),
        Counts::Float64(v) => Arc::new(Float64Array::from(v)),
    }
}

fn decode_counts(batch: &RecordBatch, path: &Path) -> Result<Counts> {
    let array = column(batch, COUNT_COLUMN, path)?;
    let counts = match array.data_type() {
        DataType::Int32 => Counts::Int32(
            typed_column::<Int32Array>(batch, COUNT_COLUMN, path)?
                .values()
                .to_vec(),
        ),
        DataType::Int64 => Counts::Int64(
            typed_column::<Int64Array>(batch, COUNT_COLUMN, path)?
                .values()
                .to_vec(),
        ),
        DataType::Float64 => Counts::Float64(
            typed_column::<Float64Array>(batch, COUNT_COLUMN, path)?
                .values()
                .to_vec(),
        ),
        other => {
            return Err(StoreError::ColumnType {
                column: COUNT_COLUMN.to_string(),
                path: path.display().to_string(),
                found: other.to_string(),
            });
        }
    };
    Ok(counts)
}

fn read_offsets(dir: &Path, bin_count: usize) -> Result<Vec<u64>> {
    let path = dir.join(INDEXES_FILE);
    let mut offsets = Vec::with_capacity(bin_count + 1);
    for batch in open_reader(&path, None)? {
        let batch = batch?;
        let values = typed_column::<Int64Array>(&batch, BIN1_OFFSET_COLUMN, &path)?;
        offsets.extend(unsigned_values(values));
    }

    if offsets.len() != bin_count + 1 {
        return Err(StoreError::CorruptIndex {
            path: path.display().to_string(),
            expected: bin_count + 1,
            found: offsets.len(),
        });
    }
    Ok(offsets)
}

fn collect_nodes(root: &Path, dir: &Path, nodes: &mut Vec<String>) -> Result<()> {
    if is_node(dir) {
        let relative: Vec<String> = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        nodes.push(format!("/{}", relative.join("/")));
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            collect_nodes(root, &entry.path(), nodes)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_bins(path: &Path, bins: &BinTable) -> Result<()> {
    let mut fields = vec![
        Field::new(CHROM_COLUMN, DataType::Utf8, false),
        Field::new(START_COLUMN, DataType::Int64, false),
        Field::new(END_COLUMN, DataType::Int64, false),
    ];
    let chroms: Vec<&str> = bins.bins.iter().map(|b| b.chr.as_str()).collect();
    let starts: Vec<u64> = bins.bins.iter().map(|b| b.start).collect();
    let ends: Vec<u64> = bins.bins.iter().map(|b| b.end).collect();
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(chroms)),
        Arc::new(signed_array(&starts)),
        Arc::new(signed_array(&ends)),
    ];

    for (name, values) in bins.columns() {
        fields.push(Field::new(name, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(values.to_vec())));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(writer_properties()))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_pixels<I>(
    path: &Path,
    bin_count: usize,
    pixels: I,
    count_type: CountType,
) -> Result<OffsetIndexer>
where
    I: IntoIterator<Item = PixelTable>,
{
    let schema = pixel_schema(count_type);
    let mut indexer = OffsetIndexer::new(bin_count, count_type);

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(writer_properties()))?;

    for partition in pixels {
        indexer.push(&partition)?;
        if partition.is_empty() {
            continue;
        }

        let PixelTable { bin1, bin2, counts } = partition;
        let columns: Vec<ArrayRef> = vec![
            Arc::new(signed_array(&bin1)),
            Arc::new(signed_array(&bin2)),
            counts_array(counts),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        writer.write(&batch)?;
        // one row group per partition
        writer.flush()?;
    }

    writer.close()?;
    Ok(indexer)
}

fn write_offsets(path: &Path, offsets: &[u64]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new(
        BIN1_OFFSET_COLUMN,
        DataType::Int64,
        false,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(signed_array(offsets))])?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(writer_properties()))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

///
/// Store whose nodes live in directories on the local filesystem
///
#[derive(Debug, Default, Clone)]
pub struct ParquetStore;

pub struct ParquetHandle {
    uri: String,
    dir: PathBuf,
    info: StoreInfo,
    offsets: Vec<u64>,
}

impl ParquetStore {
    pub fn new() -> Self {
        ParquetStore
    }
}

impl StoreHandle for ParquetHandle {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn info(&self) -> &StoreInfo {
        &self.info
    }

    fn bin_table(&self) -> Result<BinTable> {
        let path = self.dir.join(BINS_FILE);
        let mut bins: Vec<Bin> = Vec::with_capacity(self.info.bin_count);
        let mut extra: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        for batch in open_reader(&path, None)? {
            let batch = batch?;
            let chroms = typed_column::<StringArray>(&batch, CHROM_COLUMN, &path)?;
            let starts = typed_column::<Int64Array>(&batch, START_COLUMN, &path)?;
            let ends = typed_column::<Int64Array>(&batch, END_COLUMN, &path)?;

            for i in 0..batch.num_rows() {
                bins.push(Bin::new(
                    chroms.value(i),
                    starts.value(i) as u64,
                    ends.value(i) as u64,
                ));
            }

            for field in batch.schema().fields() {
                let name = field.name();
                if [CHROM_COLUMN, START_COLUMN, END_COLUMN].contains(&name.as_str()) {
                    continue;
                }
                if field.data_type() != &DataType::Float64 {
                    debug!("Skipping bin column `{}` of type {}", name, field.data_type());
                    continue;
                }

                let values = typed_column::<Float64Array>(&batch, name, &path)?;
                extra
                    .entry(name.clone())
                    .or_default()
                    .extend(values.iter().map(|v| v.unwrap_or(f64::NAN)));
            }
        }

        let mut table = BinTable::new(bins)?;
        for (name, values) in extra {
            table = table.with_column(&name, values)?;
        }
        Ok(table)
    }

    fn pixel_rows(&self, start: usize, end: usize) -> Result<PixelTable> {
        check_bin_range(start, end, self.info.bin_count)?;
        let lo = self.offsets[start] as usize;
        let hi = self.offsets[end] as usize;

        let mut rows = PixelTable::empty(self.info.count_type);
        if lo == hi {
            return Ok(rows);
        }

        let mut selectors = Vec::with_capacity(2);
        if lo > 0 {
            selectors.push(RowSelector::skip(lo));
        }
        selectors.push(RowSelector::select(hi - lo));

        let path = self.dir.join(PIXELS_FILE);
        for batch in open_reader(&path, Some(RowSelection::from(selectors)))? {
            let batch = batch?;
            let bin1 = unsigned_values(typed_column::<Int64Array>(&batch, BIN1_COLUMN, &path)?);
            let bin2 = unsigned_values(typed_column::<Int64Array>(&batch, BIN2_COLUMN, &path)?);
            let counts = decode_counts(&batch, &path)?;
            rows.append(PixelTable::new(bin1, bin2, counts)?)?;
        }

        Ok(rows)
    }
}

impl Store for ParquetStore {
    type Handle = ParquetHandle;

    fn list_nodes(&self, path: &str) -> Result<Vec<String>> {
        let root = Path::new(path);
        if !root.is_dir() {
            return Err(StoreError::Open {
                uri: path.to_string(),
                available: None,
            });
        }

        let mut nodes = Vec::new();
        collect_nodes(root, root, &mut nodes)?;
        nodes.sort();
        Ok(nodes)
    }

    fn open(&self, uri: &str) -> Result<ParquetHandle> {
        let parsed = StoreUri::parse(uri);
        let dir = node_dir(&parsed);

        if !is_node(&dir) {
            return Err(StoreError::Open {
                uri: uri.to_string(),
                available: self.list_nodes(&parsed.path).ok(),
            });
        }

        let info: StoreInfo = serde_json::from_reader(File::open(dir.join(INFO_FILE))?)?;
        let offsets = read_offsets(&dir, info.bin_count)?;
        debug!(
            "Opened {} with {} bins and {} pixels",
            uri, info.bin_count, info.nonzero_count
        );

        Ok(ParquetHandle {
            uri: uri.to_string(),
            dir,
            info,
            offsets,
        })
    }

    fn create<I>(
        &mut self,
        uri: &str,
        bins: &BinTable,
        pixels: I,
        options: &CreateOptions,
    ) -> Result<StoreInfo>
    where
        I: IntoIterator<Item = PixelTable>,
    {
        let parsed = StoreUri::parse(uri);
        let dir = node_dir(&parsed);

        if is_node(&dir) {
            if !options.truncate_existing {
                return Err(StoreError::AlreadyExists(uri.to_string()));
            }
            // the info file goes first so a half-replaced node never looks complete
            for file in [INFO_FILE, BINS_FILE, PIXELS_FILE, INDEXES_FILE] {
                let path = dir.join(file);
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
        fs::create_dir_all(&dir)?;

        write_bins(&dir.join(BINS_FILE), bins)?;
        let indexer = write_pixels(
            &dir.join(PIXELS_FILE),
            bins.len(),
            pixels,
            options.count_type,
        )?;
        let info = StoreInfo::new(
            bins,
            indexer.nonzero_count(),
            options.count_type,
            options.storage_mode,
        );
        write_offsets(&dir.join(INDEXES_FILE), &indexer.finish())?;

        let info_file = File::create(dir.join(INFO_FILE))?;
        serde_json::to_writer_pretty(info_file, &info)?;

        debug!("Wrote {} pixels to {}", info.nonzero_count, uri);
        Ok(info)
    }
}
