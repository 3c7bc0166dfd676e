// LSM-style write index tests.
// Covers the layer policy (delegation, compaction) as seen from the outside:
// whatever layer a key lives in, lookups and scans must behave like one map.

use lsm_index::codec::pack_int;
use lsm_index::{EqIndex, Error, LsmIndex, Options, RangeIndex};

fn with(min_delegation_size: usize, compaction_ratio: f64) -> LsmIndex {
    LsmIndex::with_options(
        Options::default()
            .with_min_delegation_size(min_delegation_size)
            .with_compaction_ratio(compaction_ratio),
    )
    .unwrap()
}

fn scan(index: &mut LsmIndex) -> Vec<u64> {
    index.range(None, None, false).collect()
}

// =============================================================================
// Test 1: Delegation after a scan keeps global key order
// =============================================================================
// -5, 0, 3, 1e12 are sorted by a scan, then two new keys are delegated to an
// inner layer. The next scan must interleave them correctly.
#[test]
fn delegated_keys_merge_in_order() {
    let mut index = with(2, 0.05);
    index.insert(&pack_int(-5), 1);
    index.insert(&pack_int(0), 2);
    index.insert(&pack_int(3), 3);
    index.insert(&pack_int(1_000_000_000_000), 4);
    assert_eq!(scan(&mut index), vec![1, 2, 3, 4]);

    index.insert(&pack_int(500), 5);
    index.insert(&pack_int(1), 6);
    assert_eq!(index.depth(), 2);

    assert_eq!(scan(&mut index), vec![1, 2, 6, 3, 5, 4]);
}

// =============================================================================
// Test 2: Same scenario without compaction, merge across live layers
// =============================================================================
#[test]
fn delegated_keys_merge_without_compaction() {
    let mut index = with(2, 1000.0);
    for (n, row_id) in [(-5, 1), (0, 2), (3, 3), (1_000_000_000_000, 4)] {
        index.insert(&pack_int(n), row_id);
    }
    scan(&mut index);

    index.insert(&pack_int(500), 5);
    index.insert(&pack_int(1), 6);

    assert_eq!(scan(&mut index), vec![1, 2, 6, 3, 5, 4]);
    assert_eq!(index.depth(), 2);
    assert_eq!(index.range(None, None, true).collect::<Vec<_>>(), vec![4, 5, 3, 6, 2, 1]);
}

// =============================================================================
// Test 3: Compaction folds inner layers back into the root
// =============================================================================
#[test]
fn scan_compacts_when_ratio_exceeded() {
    let mut index = with(2, 0.05);
    for n in 0..10 {
        index.insert(&pack_int(n), n as u64);
    }
    scan(&mut index);
    index.insert(&pack_int(100), 100);
    assert_eq!(index.depth(), 2);

    // 1 inner key > 5% of 10 local keys.
    let rows = scan(&mut index);
    assert_eq!(index.depth(), 1);
    assert_eq!(rows.len(), 11);
    assert_eq!(rows.last(), Some(&100));
}

// =============================================================================
// Test 4: Chains grow deeper only as each innermost layer gets sorted
// =============================================================================
#[test]
fn chain_deepens_layer_by_layer() {
    let mut index = with(2, 1000.0);
    let mut next = 0i64;
    let mut push = |index: &mut LsmIndex, n: usize| {
        for _ in 0..n {
            index.insert(&pack_int(next), next as u64);
            next += 1;
        }
    };

    push(&mut index, 3);
    scan(&mut index);
    push(&mut index, 3);
    assert_eq!(index.depth(), 2);

    // Inner layer not sorted yet: more new keys stay in it.
    push(&mut index, 3);
    assert_eq!(index.depth(), 2);

    scan(&mut index);
    push(&mut index, 1);
    assert_eq!(index.depth(), 3);

    assert_eq!(scan(&mut index), (0..10).collect::<Vec<u64>>());
    assert_eq!(index.key_count(), 10);
}

// =============================================================================
// Test 5: Inserts alone never sort or delegate
// =============================================================================
#[test]
fn insert_only_workload_stays_single_layer() {
    let mut index = with(1, 0.05);
    for n in 0..1000 {
        index.insert(&pack_int(n), n as u64);
    }
    assert_eq!(index.depth(), 1);
}

// =============================================================================
// Test 6: Existing keys are appended where they live
// =============================================================================
#[test]
fn existing_key_in_outer_layer_is_appended_in_place() {
    let mut index = with(2, 1000.0);
    index.insert(b"a", 1);
    index.insert(b"b", 2);
    scan(&mut index);
    index.insert(b"c", 3);
    assert_eq!(index.depth(), 2);

    index.insert(b"a", 4);
    index.insert(b"c", 5);

    assert_eq!(index.eq(b"a").collect::<Vec<_>>(), vec![1, 4]);
    assert_eq!(index.eq(b"c").collect::<Vec<_>>(), vec![3, 5]);
    assert_eq!(index.depth(), 2);
    assert_eq!(index.key_count(), 3);
    assert_eq!(index.row_count(), 5);
}

// =============================================================================
// Test 7: Multimap delete across layers
// =============================================================================
#[test]
fn delete_reaches_inner_layers() {
    let mut index = with(1, 1000.0);
    index.insert(b"a", 1);
    scan(&mut index);
    index.insert(b"b", 2);
    index.insert(b"b", 3);
    assert_eq!(index.depth(), 2);

    index.delete(b"b", 2);
    assert_eq!(index.eq(b"b").collect::<Vec<_>>(), vec![3]);
    index.delete(b"b", 3);
    assert_eq!(index.eq(b"b").count(), 0);
    assert_eq!(index.count(b"b"), 0);
    assert_eq!(scan(&mut index), vec![1]);

    // Missing key / row id: no-ops.
    index.delete(b"zzz", 1);
    index.delete(b"a", 42);
    assert_eq!(scan(&mut index), vec![1]);
}

// =============================================================================
// Test 8: A key emptied after a scan never shows up in the next scan
// =============================================================================
#[test]
fn emptied_key_absent_from_range() {
    let mut index = LsmIndex::new();
    index.insert(b"a", 1);
    index.insert(b"b", 2);
    index.insert(b"c", 3);
    scan(&mut index);

    index.delete(b"b", 2);
    let keys: Vec<_> = index
        .range_entries(None, None, false)
        .map(|(key, bucket)| {
            assert!(!bucket.is_empty());
            key.to_vec()
        })
        .collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
}

// =============================================================================
// Test 9: Bounded scans over a multi-layer chain
// =============================================================================
#[test]
fn bounded_range_across_layers() {
    let mut index = with(2, 1000.0);
    for n in [10, 30, 50] {
        index.insert(&pack_int(n), n as u64);
    }
    scan(&mut index);
    for n in [20, 40, 60] {
        index.insert(&pack_int(n), n as u64);
    }
    assert_eq!(index.depth(), 2);

    let (lo, hi) = (pack_int(20), pack_int(50));
    assert_eq!(index.range(Some(&lo), Some(&hi), false).collect::<Vec<_>>(), vec![20, 30, 40, 50]);
    assert_eq!(index.range(Some(&lo), Some(&hi), true).collect::<Vec<_>>(), vec![50, 40, 30, 20]);
    assert_eq!(index.range(Some(&hi), Some(&lo), false).collect::<Vec<_>>(), vec![50, 40, 30, 20]);
}

// =============================================================================
// Test 10: Explicit compaction
// =============================================================================
#[test]
fn explicit_compact_flattens_chain() {
    let mut index = with(1, 1000.0);
    index.insert(b"m", 1);
    scan(&mut index);
    index.insert(b"a", 2);
    scan(&mut index);
    index.insert(b"z", 3);
    assert_eq!(index.depth(), 3);

    index.compact();
    assert_eq!(index.depth(), 1);
    assert_eq!(scan(&mut index), vec![2, 1, 3]);
}

// =============================================================================
// Test 11: Empty index and option validation
// =============================================================================
#[test]
fn empty_index_and_options() {
    let mut index = LsmIndex::default();
    assert!(index.is_empty());
    assert_eq!(scan(&mut index), Vec::<u64>::new());
    assert_eq!(index.options(), &Options::default());

    let err = LsmIndex::with_options(Options::default().with_min_delegation_size(0)).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}

// =============================================================================
// Test 12: A scan can be abandoned part way
// =============================================================================
#[test]
fn partial_consumption() {
    let mut index: LsmIndex = (0..100i64).map(|n| (pack_int(n), n as u64)).collect();

    let first: Vec<_> = index.range(None, None, false).take(3).collect();
    assert_eq!(first, vec![0, 1, 2]);

    index.insert(&pack_int(-1), 1000);
    assert_eq!(index.range(None, None, false).next(), Some(1000));
}
