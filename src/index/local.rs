use std::slice;

use tracing::trace;

use crate::bucket::Bucket;
use crate::index::{new_key_map, Bounds, KeyMap};
use crate::types::{Key, RowId};

/// A hash map of key -> bucket with a lazily built sorted key list.
///
/// This is the building block of both indexes: the bulk [`SortedIndex`]
/// is one of these, every layer of the [`LsmIndex`] is one of these.
///
/// The sorted list is a cache. It is dropped whenever the key *set* changes
/// (new key, or a key removed because its bucket emptied) and rebuilt only
/// when a range scan asks for it. Appending to an existing bucket or
/// shrinking one to a non-empty size leaves it alone.
///
/// [`SortedIndex`]: crate::index::SortedIndex
/// [`LsmIndex`]: crate::lsm::LsmIndex
#[derive(Debug, Clone)]
pub(crate) struct LocalMap {
    map: KeyMap,
    sorted: Option<Vec<Key>>,
}

impl LocalMap {
    pub fn new() -> Self {
        LocalMap {
            map: new_key_map(),
            sorted: None,
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Bucket> {
        self.map.get(key)
    }

    /// Append to an existing bucket. Returns false, untouched, if `key` is new.
    pub fn append(&mut self, key: &[u8], row_id: RowId) -> bool {
        match self.map.get_mut(key) {
            Some(bucket) => {
                bucket.push(row_id);
                true
            }
            None => false,
        }
    }

    /// Append to `key`'s bucket, creating it if needed.
    pub fn insert(&mut self, key: &[u8], row_id: RowId) {
        if !self.append(key, row_id) {
            self.map.insert(key.to_vec(), Bucket::with_row_id(row_id));
            self.sorted = None;
        }
    }

    /// Remove one occurrence of `row_id` under `key`.
    ///
    /// Returns false if `key` does not live in this map at all, so a caller
    /// can fall through to another layer. A missing row id under a present
    /// key still counts as handled.
    pub fn remove(&mut self, key: &[u8], row_id: RowId) -> bool {
        let Some(bucket) = self.map.get_mut(key) else {
            return false;
        };
        if bucket.remove(row_id) && bucket.is_empty() {
            self.map.remove(key);
            self.sorted = None;
        }
        true
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted.is_some()
    }

    /// Build the sorted key list if it is missing.
    pub fn ensure_sorted(&mut self) {
        if self.sorted.is_none() {
            let mut keys: Vec<Key> = self.map.keys().cloned().collect();
            keys.sort_unstable();
            trace!(keys = keys.len(), "rebuilt sorted key cache");
            self.sorted = Some(keys);
        }
    }

    /// Install a sorted key list computed elsewhere (compaction).
    pub fn set_sorted(&mut self, keys: Vec<Key>) {
        debug_assert_eq!(keys.len(), self.map.len());
        self.sorted = Some(keys);
    }

    /// Key/bucket pairs inside `bounds`, in scan order.
    ///
    /// Yields nothing if the sorted list has not been built.
    pub fn entries<'a>(&'a self, bounds: &Bounds<'_>) -> LocalEntries<'a> {
        let keys: &[Key] = match &self.sorted {
            Some(sorted) => &sorted[bounds.span(sorted)],
            None => &[],
        };
        LocalEntries {
            keys: keys.iter(),
            map: &self.map,
            reverse: bounds.reverse,
        }
    }

    /// Move every key/bucket of `other` into this map. Sort order is lost.
    pub fn absorb(&mut self, other: LocalMap) {
        self.map.extend(other.map);
        self.sorted = None;
    }

    pub fn key_count(&self) -> usize {
        self.map.len()
    }

    pub fn row_count(&self) -> usize {
        self.map.values().map(Bucket::len).sum()
    }
}

/// Sorted walk over one map's keys and buckets.
#[derive(Debug, Clone)]
pub struct LocalEntries<'a> {
    keys: slice::Iter<'a, Key>,
    map: &'a KeyMap,
    reverse: bool,
}

impl<'a> Iterator for LocalEntries<'a> {
    type Item = (&'a [u8], &'a Bucket);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = if self.reverse {
                self.keys.next_back()?
            } else {
                self.keys.next()?
            };
            // Every cached key has a bucket while the cache is valid.
            if let Some(bucket) = self.map.get(key.as_slice()) {
                return Some((key.as_slice(), bucket));
            }
        }
    }
}
