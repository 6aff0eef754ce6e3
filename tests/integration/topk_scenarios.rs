//! Hand-computed top-K index scenarios.

use std::sync::Arc;

use miner_rs::{Bound, TopKIndex, VecPatternSink};

/// `(support, full pattern)` pairs; the last item plays the extension.
const PATTERNS: &[(u32, &[u32])] = &[
    (100, &[0]),
    (90, &[1]),
    (80, &[2, 3]),
    (70, &[1, 2]),
    (60, &[3]),
    (20, &[0]),
    (10, &[4]),
];

fn feed(index: &TopKIndex, patterns: &[(u32, &[u32])]) {
    for &(support, pattern) in patterns {
        let (ext, parent) = pattern.split_last().unwrap();
        index.precollect(support, parent, *ext, *ext);
    }
}

#[test]
fn per_item_lists_match_hand_computation() {
    let index = TopKIndex::new(2, false, (0..5u32).map(|i| (i, 100)));
    feed(&index, PATTERNS);

    let expected: Vec<(u32, Vec<u32>)> = vec![
        (0, vec![100, 20]),
        (1, vec![90, 70]),
        (2, vec![80, 70]),
        (3, vec![80, 60]),
        (4, vec![10]),
    ];
    assert_eq!(index.support_lists(), expected);
}

#[test]
fn bounds_track_list_state() {
    let index = TopKIndex::new(2, false, (0..6u32).map(|i| (i, 100)));
    assert_eq!(index.bound(0), Bound::NotFull);
    assert_eq!(index.bound(9), Bound::Untracked);

    feed(&index, PATTERNS);
    assert_eq!(index.bound(0), Bound::Threshold(20));
    assert_eq!(index.bound(3), Bound::Threshold(60));
    // Item 4 saw one pattern; one slot still free.
    assert_eq!(index.bound(4), Bound::NotFull);
    // Item 5 never saw anything.
    assert_eq!(index.bound(5), Bound::NotFull);
}

#[test]
fn rejected_pattern_leaves_no_trace() {
    let index = TopKIndex::new(1, false, (0..4u32).map(|i| (i, 100)));
    feed(&index, &[(100, &[0]), (90, &[1])]);
    let before = index.support_lists();

    // Both target lists are full with higher supports.
    let rejected = index.precollect(5, &[0], 1, 1);
    assert_eq!(rejected.ref_count(), 0);
    assert_eq!(rejected.items(), None, "rejected patterns never materialize");
    assert_eq!(index.support_lists(), before);
}

#[test]
fn accepted_pattern_materializes_with_extension_in_place() {
    let index = TopKIndex::new(2, false, (0..8u32).map(|i| (i, 100)));
    let placeholder = index.precollect(40, &[1, 5], 3, 3);

    assert_eq!(placeholder.ref_count(), 3);
    assert_eq!(placeholder.items(), Some(&[1, 3, 5][..]));
    assert_eq!(placeholder.support(), 40);
}

#[test]
fn eviction_drops_refcount_of_the_loser() {
    let index = TopKIndex::new(1, false, [(7u32, 100)]);
    let first = index.precollect(30, &[], 7, 7);
    assert_eq!(first.ref_count(), 1);

    let second = index.precollect(50, &[], 7, 7);
    assert_eq!(second.ref_count(), 1);
    assert_eq!(first.ref_count(), 0, "evicted pattern is released");
    assert_eq!(index.support_lists(), vec![(7, vec![50])]);
}

#[test]
fn drain_emits_per_list_or_unique() {
    let plain = TopKIndex::new(2, false, (0..5u32).map(|i| (i, 100)));
    feed(&plain, PATTERNS);
    let sink = VecPatternSink::new();
    // Nine filled slots across the five lists.
    assert_eq!(plain.drain(&sink), 9);

    let records = sink.take();
    assert_eq!(records.len(), 9);
    // Ascending by item, descending by support within an item.
    assert_eq!(records[0], (100, vec![0]));
    assert_eq!(records[1], (20, vec![0]));
    assert_eq!(records[8], (10, vec![4]));

    // Dedup is keyed on item content: the shared patterns [2,3] and [1,2]
    // each emit once, and the second [0] (support 20) is swallowed by the
    // first (support 100) because their item lists are identical.
    let unique = TopKIndex::new(2, true, (0..5u32).map(|i| (i, 100)));
    feed(&unique, PATTERNS);
    let sink = VecPatternSink::new();
    assert_eq!(unique.drain(&sink), 6);
}

#[test]
fn concurrent_inserts_keep_lists_sorted() {
    let index = Arc::new(TopKIndex::new(4, false, (0..4u32).map(|i| (i, 10_000))));

    std::thread::scope(|scope| {
        for t in 0..4u32 {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for s in 1..=1000u32 {
                    // Every thread offers to every list, distinct supports.
                    index.precollect(s * 4 + t, &[0, 1, 2], 3, 3);
                }
            });
        }
    });

    for (_, supports) in index.support_lists() {
        assert_eq!(supports.len(), 4);
        for pair in supports.windows(2) {
            assert!(pair[0] > pair[1], "descending, no duplicates");
        }
        // The four largest supports overall are 4003, 4002, 4001, 4000.
        assert_eq!(supports, vec![4003, 4002, 4001, 4000]);
    }
}
