use std::rc::Rc;

use fxhash::FxHashMap as HashMap;

use coolrs_core::models::{BinTable, PixelTable};

use crate::error::{Result, StoreError};
use crate::index::OffsetIndexer;
use crate::info::{CreateOptions, StoreInfo};
use crate::traits::{Store, StoreHandle, check_bin_range};
use crate::uri::StoreUri;

struct MemoryNode {
    info: StoreInfo,
    bins: BinTable,
    pixels: PixelTable,
    offsets: Vec<u64>,
    partition_sizes: Vec<usize>,
}

///
/// An in-process store. Paths and nodes are plain map keys; nothing touches disk.
///
#[derive(Default)]
pub struct MemoryStore {
    paths: HashMap<String, HashMap<String, Rc<MemoryNode>>>,
}

pub struct MemoryHandle {
    uri: String,
    node: Rc<MemoryNode>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryHandle {
    ///
    /// Sizes of the pixel partitions the node was written with, in write order
    ///
    pub fn partition_sizes(&self) -> &[usize] {
        &self.node.partition_sizes
    }
}

impl StoreHandle for MemoryHandle {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn info(&self) -> &StoreInfo {
        &self.node.info
    }

    fn bin_table(&self) -> Result<BinTable> {
        Ok(self.node.bins.clone())
    }

    fn pixel_rows(&self, start: usize, end: usize) -> Result<PixelTable> {
        check_bin_range(start, end, self.node.info.bin_count)?;
        let lo = self.node.offsets[start] as usize;
        let hi = self.node.offsets[end] as usize;
        Ok(self.node.pixels.slice(lo..hi))
    }
}

impl Store for MemoryStore {
    type Handle = MemoryHandle;

    fn list_nodes(&self, path: &str) -> Result<Vec<String>> {
        let nodes = self.paths.get(path).ok_or_else(|| StoreError::Open {
            uri: path.to_string(),
            available: None,
        })?;

        let mut names: Vec<String> = nodes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn open(&self, uri: &str) -> Result<MemoryHandle> {
        let parsed = StoreUri::parse(uri);

        let node = self
            .paths
            .get(&parsed.path)
            .and_then(|nodes| nodes.get(&parsed.node))
            .ok_or_else(|| StoreError::Open {
                uri: uri.to_string(),
                available: self.list_nodes(&parsed.path).ok(),
            })?;

        Ok(MemoryHandle {
            uri: uri.to_string(),
            node: Rc::clone(node),
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
        let exists = self
            .paths
            .get(&parsed.path)
            .is_some_and(|nodes| nodes.contains_key(&parsed.node));
        if exists && !options.truncate_existing {
            return Err(StoreError::AlreadyExists(uri.to_string()));
        }

        let mut indexer = OffsetIndexer::new(bins.len(), options.count_type);
        let mut all_pixels = PixelTable::empty(options.count_type);
        let mut partition_sizes = Vec::new();

        for partition in pixels {
            indexer.push(&partition)?;
            partition_sizes.push(partition.len());
            all_pixels.append(partition)?;
        }

        let info = StoreInfo::new(
            bins,
            indexer.nonzero_count(),
            options.count_type,
            options.storage_mode,
        );
        let node = MemoryNode {
            info: info.clone(),
            bins: bins.clone(),
            pixels: all_pixels,
            offsets: indexer.finish(),
            partition_sizes,
        };

        self.paths
            .entry(parsed.path)
            .or_default()
            .insert(parsed.node, Rc::new(node));

        Ok(info)
    }
}
