//! # LSM Index
//!
//! An in-memory secondary-index engine: maps order-preserving binary keys to
//! sets of row ids, with O(1) equality lookups and ordered range scans.
//!
//! ## Pieces
//! - [`codec`]: encodes integers, doubles and strings into keys whose byte
//!   order matches the value order.
//! - [`SortedIndex`]: one hash map plus a sorted key list rebuilt on demand.
//!   Best when the index is built once and then read.
//! - [`LsmIndex`]: a chain of such maps. New keys land in a small inner layer
//!   instead of forcing the big one to re-sort, and layers are folded back
//!   together during range scans.
//!
//! Both implement [`EqIndex`] and [`RangeIndex`], the contract the table layer
//! programs against.
//!
//! ```
//! use lsm_index::{codec, EqIndex, LsmIndex, RangeIndex};
//!
//! let mut index = LsmIndex::new();
//! for (row_id, n) in [(1, 30i64), (2, -7), (3, 12)] {
//!     index.insert(&codec::pack_int(n), row_id);
//! }
//!
//! let lo = codec::pack_int(0);
//! let rows: Vec<u64> = index.range(Some(&lo), None, false).collect();
//! assert_eq!(rows, vec![3, 1]);
//! ```
//!
//! Nothing here is thread-safe on its own; share an index across threads
//! only behind external synchronization.

pub mod bucket;
pub mod codec;
pub mod error;
pub mod index;
pub mod iterator;
pub mod lsm;
pub mod types;

// Public re-exports for the top-level API
pub use bucket::{Bucket, BucketIter};
pub use error::{Error, Result};
pub use index::{EqIndex, RangeIndex, SortedIndex};
pub use lsm::{LsmIndex, Options};
pub use types::{Key, RowId};
