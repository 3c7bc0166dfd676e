use std::slice::ChunksExact;

use crate::types::{pack_row_id, unpack_row_id, RowId, ROW_ID_WIDTH};

/// All row ids stored under one key, packed back to back.
///
/// ```text
/// ┌──────────────┬──────────────┬──────────────┐
/// │ row id 0 (8B)│ row id 1 (8B)│ row id 2 (8B)│ ...
/// └──────────────┴──────────────┴──────────────┘
/// ```
///
/// Order is insertion order, not sorted. Duplicates are allowed; removal takes
/// out the first matching slot only. An index never keeps an empty bucket
/// around: once the last row id is removed the key goes with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    packed: Vec<u8>,
}

impl Bucket {
    /// Create an empty bucket.
    pub fn new() -> Self {
        Bucket { packed: Vec::new() }
    }

    /// Create a bucket holding a single row id.
    pub fn with_row_id(row_id: RowId) -> Self {
        Bucket {
            packed: pack_row_id(row_id).to_vec(),
        }
    }

    /// Append a row id.
    pub fn push(&mut self, row_id: RowId) {
        self.packed.extend_from_slice(&pack_row_id(row_id));
    }

    /// Remove the first occurrence of `row_id`. Returns false if it wasn't here.
    ///
    /// Only 8-byte-aligned slots are compared, so a match straddling two
    /// packed ids can never be mistaken for a row id.
    pub fn remove(&mut self, row_id: RowId) -> bool {
        match self.position(row_id) {
            Some(slot) => {
                let start = slot * ROW_ID_WIDTH;
                self.packed.drain(start..start + ROW_ID_WIDTH);
                true
            }
            None => false,
        }
    }

    /// Whether `row_id` is stored in this bucket.
    pub fn contains(&self, row_id: RowId) -> bool {
        self.position(row_id).is_some()
    }

    /// Number of row ids.
    pub fn len(&self) -> usize {
        self.packed.len() / ROW_ID_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Row ids in packing order.
    pub fn iter(&self) -> BucketIter<'_> {
        BucketIter::new(&self.packed, false)
    }

    /// Row ids in reverse packing order.
    pub fn iter_rev(&self) -> BucketIter<'_> {
        BucketIter::new(&self.packed, true)
    }

    /// The packed representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.packed
    }

    fn position(&self, row_id: RowId) -> Option<usize> {
        let needle = pack_row_id(row_id);
        self.packed
            .chunks_exact(ROW_ID_WIDTH)
            .position(|slot| slot == needle)
    }
}

impl<'a> IntoIterator for &'a Bucket {
    type Item = RowId;
    type IntoIter = BucketIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Decodes the row ids of one bucket, in either direction.
///
/// Also used as the result type of equality lookups; a miss is simply an
/// iterator over nothing.
#[derive(Debug, Clone)]
pub struct BucketIter<'a> {
    chunks: ChunksExact<'a, u8>,
    reverse: bool,
}

impl<'a> BucketIter<'a> {
    fn new(packed: &'a [u8], reverse: bool) -> Self {
        BucketIter {
            chunks: packed.chunks_exact(ROW_ID_WIDTH),
            reverse,
        }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        BucketIter::new(&[], false)
    }
}

impl Iterator for BucketIter<'_> {
    type Item = RowId;

    fn next(&mut self) -> Option<RowId> {
        let slot = if self.reverse {
            self.chunks.next_back()
        } else {
            self.chunks.next()
        };
        slot.map(unpack_row_id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for BucketIter<'_> {}
