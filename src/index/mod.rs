//! The index contract shared by both implementations.
//!
//! The table layer talks to an index only through these two traits:
//! [`EqIndex`] for point lookups and maintenance, [`RangeIndex`] when it also
//! needs ordered scans. Keys are opaque bytes (see [`crate::codec`]).
//!
//! Neither implementation synchronizes internally. A range scan needs
//! `&mut self` because it may sort or compact lazily, so the borrow checker
//! already rules out mutation while a scan is live. Callers sharing an index
//! across threads must serialize access themselves (a single writer, or a
//! lock around the whole index).

pub mod local;
pub mod sorted;

pub use local::LocalEntries;
pub use sorted::SortedIndex;

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use xxhash_rust::xxh3::Xxh3;

use crate::bucket::{Bucket, BucketIter};
use crate::types::{Key, RowId};

/// Key -> bucket map used by every layer, hashed with xxh3.
pub(crate) type KeyMap = HashMap<Key, Bucket, BuildHasherDefault<Xxh3>>;

pub(crate) fn new_key_map() -> KeyMap {
    HashMap::default()
}

/// Equality lookups plus maintenance.
pub trait EqIndex {
    /// Add `row_id` under `key`. Duplicate pairs are kept.
    fn insert(&mut self, key: &[u8], row_id: RowId);

    /// Remove one occurrence of `row_id` under `key`. No-op if absent.
    fn delete(&mut self, key: &[u8], row_id: RowId);

    /// Row ids stored under `key`, in insertion order. Empty on a miss.
    fn eq(&self, key: &[u8]) -> BucketIter<'_>;
}

/// Ordered scans on top of [`EqIndex`].
pub trait RangeIndex: EqIndex {
    type Range<'a>: Iterator<Item = RowId>
    where
        Self: 'a;

    /// Row ids of every key `k` with `start <= k <= end`, in key order.
    ///
    /// `None` leaves that side unbounded. With `reverse`, keys are visited
    /// from `end` down to `start` and each bucket is emitted back to front.
    /// If both bounds are given and `start > end`, the bounds are swapped and
    /// the scan runs in reverse whatever `reverse` says.
    fn range(
        &mut self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        reverse: bool,
    ) -> Self::Range<'_>;
}

/// Normalized scan bounds. Both ends inclusive.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds<'k> {
    pub start: Option<&'k [u8]>,
    pub end: Option<&'k [u8]>,
    pub reverse: bool,
}

impl<'k> Bounds<'k> {
    pub fn new(start: Option<&'k [u8]>, end: Option<&'k [u8]>, reverse: bool) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => Bounds {
                start: Some(e),
                end: Some(s),
                reverse: true,
            },
            _ => Bounds {
                start,
                end,
                reverse,
            },
        }
    }

    /// Positions `[lo, hi)` of the keys inside these bounds.
    pub fn span(&self, sorted: &[Key]) -> std::ops::Range<usize> {
        let lo = self.start.map_or(0, |s| lower_bound(sorted, s));
        let hi = self.end.map_or(sorted.len(), |e| upper_bound(sorted, e));
        lo..hi.max(lo)
    }
}

/// First position whose key is `>= target`.
pub fn lower_bound(sorted: &[Key], target: &[u8]) -> usize {
    sorted.partition_point(|k| k.as_slice() < target)
}

/// First position whose key is `> target`.
pub fn upper_bound(sorted: &[Key], target: &[u8]) -> usize {
    sorted.partition_point(|k| k.as_slice() <= target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&[u8]]) -> Vec<Key> {
        raw.iter().map(|k| k.to_vec()).collect()
    }

    #[test]
    fn bounds_on_sorted_keys() {
        let sorted = keys(&[b"b", b"d", b"d2", b"f"]);
        assert_eq!(lower_bound(&sorted, b"a"), 0);
        assert_eq!(lower_bound(&sorted, b"d"), 1);
        assert_eq!(upper_bound(&sorted, b"d"), 2);
        assert_eq!(upper_bound(&sorted, b"z"), 4);
    }

    #[test]
    fn inverted_bounds_become_reverse_scan() {
        let b = Bounds::new(Some(b"m"), Some(b"c"), false);
        assert_eq!(b.start, Some(&b"c"[..]));
        assert_eq!(b.end, Some(&b"m"[..]));
        assert!(b.reverse);
    }

    #[test]
    fn span_with_open_ends() {
        let sorted = keys(&[b"b", b"d", b"f"]);
        assert_eq!(Bounds::new(None, None, false).span(&sorted), 0..3);
        assert_eq!(Bounds::new(Some(b"c"), None, false).span(&sorted), 1..3);
        assert_eq!(Bounds::new(None, Some(b"d"), false).span(&sorted), 0..2);
        assert_eq!(Bounds::new(Some(b"g"), Some(b"h"), false).span(&sorted), 3..3);
    }
}
