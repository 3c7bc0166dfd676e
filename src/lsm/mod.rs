//! Write-optimized index built from a chain of layers.
//!
//! Each layer is a key -> bucket map with its own lazily sorted key list.
//! The chain is stored outermost first in a `Vec`: layer `i + 1` is the inner
//! layer of layer `i`, and the outermost layer is simply index 0.
//!
//! ```text
//!   layers[0]  (outermost)   a c f k q x      sorted
//!      │
//!   layers[1]                b g r            sorted
//!      │
//!   layers[2]  (innermost)   d m              unsorted, takes new keys
//! ```
//!
//! Every key lives in exactly one layer. Inserts for an existing key append
//! to its bucket wherever it is; new keys go to the innermost layer. Once the
//! innermost layer has been sorted (by a range scan) and is big enough,
//! further new keys open a fresh inner layer instead of dirtying the sort.
//! So inserts never sort, and a range scan only re-sorts the small layers
//! that changed since the last scan.
//!
//! Range scans merge all layers. Before merging, a layer whose inner layers
//! have outgrown `compaction_ratio` of its own key count absorbs them,
//! which keeps the chain shallow.

mod options;

pub use options::Options;

use tracing::debug;

use crate::bucket::{Bucket, BucketIter};
use crate::error::Result;
use crate::index::local::LocalMap;
use crate::index::{Bounds, EqIndex, RangeIndex};
use crate::iterator::{MergeIterator, RowIds};
use crate::types::{Key, RowId};

/// LSM-style secondary index. See the [module docs](self).
#[derive(Debug, Clone)]
pub struct LsmIndex {
    /// Outermost first. Never empty.
    layers: Vec<LocalMap>,
    options: Options,
}

impl LsmIndex {
    /// Create an empty index with default [`Options`].
    pub fn new() -> Self {
        LsmIndex {
            layers: vec![LocalMap::new()],
            options: Options::default(),
        }
    }

    /// Create an empty index with custom options.
    pub fn with_options(options: Options) -> Result<Self> {
        options.validate()?;
        Ok(LsmIndex {
            layers: vec![LocalMap::new()],
            options,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Number of layers in the chain (1 when nothing has been delegated).
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of row ids under `key`.
    pub fn count(&self, key: &[u8]) -> usize {
        self.find(key).map_or(0, Bucket::len)
    }

    /// Number of distinct keys across the whole chain.
    pub fn key_count(&self) -> usize {
        self.layers.iter().map(LocalMap::key_count).sum()
    }

    /// Total number of row ids across the whole chain.
    pub fn row_count(&self) -> usize {
        self.layers.iter().map(LocalMap::row_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.key_count() == 0)
    }

    /// Fold every inner layer into the outermost one right now.
    ///
    /// Range scans already do this lazily when the ratio is exceeded; this is
    /// for callers that know a read-heavy phase is coming.
    pub fn compact(&mut self) {
        if self.layers.len() > 1 {
            self.compact_at(0);
        }
    }

    /// Like [`RangeIndex::range`], but yields each key with its bucket.
    pub fn range_entries(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        reverse: bool,
    ) -> MergeIterator<'_> {
        let bounds = Bounds::new(start, end, reverse);
        self.prepare_scan();
        self.merged(&bounds)
    }

    fn find(&self, key: &[u8]) -> Option<&Bucket> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// Compact where the ratio says so, then make sure every layer is sorted.
    ///
    /// Layers are checked outermost first; compacting layer `i` swallows
    /// everything below it, so at most one compaction happens per scan.
    fn prepare_scan(&mut self) {
        for depth in 0..self.layers.len().saturating_sub(1) {
            let local = self.layers[depth].key_count();
            let inner: usize = self.layers[depth + 1..]
                .iter()
                .map(LocalMap::key_count)
                .sum();
            if self.options.should_compact(local, inner) {
                self.compact_at(depth);
                break;
            }
        }
        for layer in &mut self.layers {
            layer.ensure_sorted();
        }
    }

    /// Merge every layer below `depth` into it and drop them.
    fn compact_at(&mut self, depth: usize) {
        for layer in &mut self.layers[depth..] {
            layer.ensure_sorted();
        }

        let bounds = Bounds::new(None, None, false);
        let merged: Vec<Key> = MergeIterator::new(
            self.layers[depth..]
                .iter()
                .map(|layer| layer.entries(&bounds))
                .collect(),
            false,
        )
        .map(|(key, _)| key.to_vec())
        .collect();

        let absorbed = self.layers.split_off(depth + 1);
        let dropped = absorbed.len();
        let local_before = self.layers[depth].key_count();

        let target = &mut self.layers[depth];
        for inner in absorbed {
            target.absorb(inner);
        }
        target.set_sorted(merged);

        debug!(
            depth,
            absorbed_keys = target.key_count() - local_before,
            dropped_layers = dropped,
            "compacted inner layers"
        );
    }

    fn merged(&self, bounds: &Bounds<'_>) -> MergeIterator<'_> {
        let sources = self
            .layers
            .iter()
            .map(|layer| layer.entries(bounds))
            .collect();
        MergeIterator::new(sources, bounds.reverse)
    }
}

impl Default for LsmIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<[u8]>> Extend<(K, RowId)> for LsmIndex {
    fn extend<I: IntoIterator<Item = (K, RowId)>>(&mut self, iter: I) {
        for (key, row_id) in iter {
            self.insert(key.as_ref(), row_id);
        }
    }
}

impl<K: AsRef<[u8]>> FromIterator<(K, RowId)> for LsmIndex {
    fn from_iter<I: IntoIterator<Item = (K, RowId)>>(iter: I) -> Self {
        let mut index = LsmIndex::new();
        index.extend(iter);
        index
    }
}

impl EqIndex for LsmIndex {
    /// Algorithm:
    ///   1. If some layer already holds `key`, append to its bucket
    ///   2. Otherwise the key is new; it can only go to the innermost layer
    ///   3. If that layer is sorted and has reached the delegation threshold,
    ///      open a new inner layer for the key
    ///   4. Else insert it locally, invalidating that layer's sort
    fn insert(&mut self, key: &[u8], row_id: RowId) {
        let total = self.key_count();
        let innermost = self.layers.len() - 1;

        for layer in &mut self.layers[..innermost] {
            if layer.append(key, row_id) {
                return;
            }
        }

        let threshold = self.options.delegation_threshold(total);
        let layer = &mut self.layers[innermost];
        if layer.append(key, row_id) {
            return;
        }

        if layer.is_sorted() && layer.key_count() >= threshold {
            debug!(
                depth = innermost + 1,
                local_keys = layer.key_count(),
                threshold,
                "delegating new keys to inner layer"
            );
            let mut inner = LocalMap::new();
            inner.insert(key, row_id);
            self.layers.push(inner);
        } else {
            layer.insert(key, row_id);
        }
    }

    fn delete(&mut self, key: &[u8], row_id: RowId) {
        for layer in &mut self.layers {
            if layer.remove(key, row_id) {
                return;
            }
        }
    }

    fn eq(&self, key: &[u8]) -> BucketIter<'_> {
        self.find(key).map_or_else(BucketIter::empty, Bucket::iter)
    }
}

impl RangeIndex for LsmIndex {
    type Range<'a> = RowIds<'a, MergeIterator<'a>>;

    fn range(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        reverse: bool,
    ) -> Self::Range<'_> {
        let bounds = Bounds::new(start, end, reverse);
        self.prepare_scan();
        RowIds::new(self.merged(&bounds), bounds.reverse)
    }
}
