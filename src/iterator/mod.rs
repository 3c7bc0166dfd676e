pub mod merge;

pub use merge::MergeIterator;

use crate::bucket::{Bucket, BucketIter};
use crate::types::RowId;

/// Flattens a key-ordered stream of buckets into row ids.
///
/// Every sorted source (one map's entries, the merged view of an LSM chain)
/// yields `(key, bucket)` pairs; range scans wrap them in this adapter. Work
/// is done as the caller pulls: stop consuming and nothing more is decoded.
///
/// In a reverse scan each bucket is also walked back to front, so the whole
/// output is the exact reverse of the forward scan.
#[derive(Debug, Clone)]
pub struct RowIds<'a, I> {
    entries: I,
    current: BucketIter<'a>,
    reverse: bool,
}

impl<'a, I> RowIds<'a, I>
where
    I: Iterator<Item = (&'a [u8], &'a Bucket)>,
{
    pub(crate) fn new(entries: I, reverse: bool) -> Self {
        RowIds {
            entries,
            current: BucketIter::empty(),
            reverse,
        }
    }
}

impl<'a, I> Iterator for RowIds<'a, I>
where
    I: Iterator<Item = (&'a [u8], &'a Bucket)>,
{
    type Item = RowId;

    fn next(&mut self) -> Option<RowId> {
        loop {
            if let Some(row_id) = self.current.next() {
                return Some(row_id);
            }
            let (_, bucket) = self.entries.next()?;
            self.current = if self.reverse {
                bucket.iter_rev()
            } else {
                bucket.iter()
            };
        }
    }
}
