use crate::bucket::{Bucket, BucketIter};
use crate::index::local::{LocalEntries, LocalMap};
use crate::index::{Bounds, EqIndex, RangeIndex};
use crate::iterator::RowIds;
use crate::types::RowId;

/// Build-once, query-many index.
///
/// A single key -> bucket map plus a sorted key list that is rebuilt in full
/// (O(n log n)) on the first range scan after any change to the key set.
/// Cheap for bulk loads followed by reads; for workloads that interleave
/// inserts with range scans use [`LsmIndex`](crate::lsm::LsmIndex) instead.
///
/// ```text
///   map:    "b" -> [7]   "a" -> [1, 4]   "c" -> [2]
///   sorted: ["a", "b", "c"]        (absent until a range scan needs it)
///
///   range(Some("a"), Some("b"), false) -> 1, 4, 7
///   range(Some("a"), Some("b"), true)  -> 7, 4, 1
/// ```
#[derive(Debug, Clone)]
pub struct SortedIndex {
    local: LocalMap,
}

impl SortedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        SortedIndex {
            local: LocalMap::new(),
        }
    }

    /// Build from a slice of `(key, row_id)` pairs.
    pub fn from_pairs<K: AsRef<[u8]>>(pairs: &[(K, RowId)]) -> Self {
        Self::from_iter_pairs(pairs.iter().map(|(key, row_id)| (key, *row_id)))
    }

    /// Build from a (possibly lazily produced) stream of `(key, row_id)` pairs.
    ///
    /// Pairs are appended in stream order, so duplicates of a key keep the
    /// order they were produced in.
    pub fn from_iter_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, RowId)>,
        K: AsRef<[u8]>,
    {
        let mut index = SortedIndex::new();
        for (key, row_id) in pairs {
            index.local.insert(key.as_ref(), row_id);
        }
        index
    }

    /// Number of row ids under `key`.
    pub fn count(&self, key: &[u8]) -> usize {
        self.local.get(key).map_or(0, Bucket::len)
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.local.key_count()
    }

    /// Total number of row ids across all keys. O(number of keys).
    pub fn row_count(&self) -> usize {
        self.local.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.local.key_count() == 0
    }

    /// Like [`RangeIndex::range`], but yields each key with its bucket.
    pub fn range_entries(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        reverse: bool,
    ) -> LocalEntries<'_> {
        let bounds = Bounds::new(start, end, reverse);
        self.local.ensure_sorted();
        self.local.entries(&bounds)
    }
}

impl Default for SortedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<[u8]>> FromIterator<(K, RowId)> for SortedIndex {
    fn from_iter<I: IntoIterator<Item = (K, RowId)>>(iter: I) -> Self {
        Self::from_iter_pairs(iter)
    }
}

impl EqIndex for SortedIndex {
    fn insert(&mut self, key: &[u8], row_id: RowId) {
        self.local.insert(key, row_id);
    }

    fn delete(&mut self, key: &[u8], row_id: RowId) {
        self.local.remove(key, row_id);
    }

    fn eq(&self, key: &[u8]) -> BucketIter<'_> {
        self.local.get(key).map_or_else(BucketIter::empty, Bucket::iter)
    }
}

impl RangeIndex for SortedIndex {
    type Range<'a> = RowIds<'a, LocalEntries<'a>>;

    fn range(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        reverse: bool,
    ) -> Self::Range<'_> {
        let bounds = Bounds::new(start, end, reverse);
        self.local.ensure_sorted();
        RowIds::new(self.local.entries(&bounds), bounds.reverse)
    }
}
