use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::bucket::Bucket;
use crate::index::LocalEntries;

/// Merges the sorted entries of every layer in an LSM chain into one stream.
///
/// K-way merge over a `BinaryHeap` holding the current head of each source.
/// Each pop yields the smallest key (largest, in a reverse scan) and pulls
/// the next entry from the same source. Memory is one heap slot per layer,
/// independent of how many entries the scan produces.
///
/// Sources are ordered outermost first. A key lives in exactly one layer, so
/// unlike a storage-engine merge there is nothing to deduplicate: two heads
/// with the same key mean the chain is corrupt, and the scan panics on the
/// spot instead of yielding either of them.
#[derive(Debug)]
pub struct MergeIterator<'a> {
    sources: Vec<LocalEntries<'a>>,
    heap: BinaryHeap<HeapEntry<'a>>,
    reverse: bool,
}

impl<'a> MergeIterator<'a> {
    /// Create a merge over `sources`, all already positioned on the same
    /// bounds and direction.
    pub(crate) fn new(mut sources: Vec<LocalEntries<'a>>, reverse: bool) -> Self {
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (source, entries) in sources.iter_mut().enumerate() {
            if let Some((key, bucket)) = entries.next() {
                heap.push(HeapEntry {
                    key,
                    bucket,
                    source,
                    reverse,
                });
            }
        }
        MergeIterator {
            sources,
            heap,
            reverse,
        }
    }
}

impl<'a> Iterator for MergeIterator<'a> {
    type Item = (&'a [u8], &'a Bucket);

    fn next(&mut self) -> Option<Self::Item> {
        let top = self.heap.pop()?;

        if let Some(next) = self.heap.peek() {
            if next.key == top.key {
                panic!(
                    "index invariant violated: key {:02x?} present in layers {} and {}",
                    top.key, top.source, next.source
                );
            }
        }

        if let Some((key, bucket)) = self.sources[top.source].next() {
            self.heap.push(HeapEntry {
                key,
                bucket,
                source: top.source,
                reverse: self.reverse,
            });
        }

        Some((top.key, top.bucket))
    }
}

/// Current head of one source.
#[derive(Debug)]
struct HeapEntry<'a> {
    key: &'a [u8],
    bucket: &'a Bucket,
    source: usize,
    reverse: bool,
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert for ascending scans.
        let by_key = if self.reverse {
            self.key.cmp(other.key)
        } else {
            other.key.cmp(self.key)
        };
        by_key.then_with(|| other.source.cmp(&self.source))
    }
}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}

impl Eq for HeapEntry<'_> {}
