//! Structural invariants of the top-K index under random insert sequences.

use proptest::prelude::*;

use miner_rs::{Bound, PatternPlaceholder, TopKIndex};
use std::sync::Arc;

const ITEMS: u32 = 6;

/// A random pattern: support plus a sorted, deduped item set with the
/// extension split off.
fn pattern_strategy() -> impl Strategy<Value = (u32, Vec<u32>)> {
    (
        1..=500u32,
        proptest::collection::btree_set(0..ITEMS, 1..=4),
    )
        .prop_map(|(support, items)| (support, items.into_iter().collect()))
}

/// Feeds every pattern and records, per placeholder, whether any list
/// accepted it at insert time. Later evictions can drop an accepted
/// placeholder's refcount back to zero, so acceptance has to be sampled
/// here rather than reconstructed afterwards.
fn feed(
    index: &TopKIndex,
    patterns: &[(u32, Vec<u32>)],
) -> Vec<(Arc<PatternPlaceholder>, bool)> {
    patterns
        .iter()
        .map(|(support, pattern)| {
            let (ext, parent) = pattern.split_last().unwrap();
            let placeholder = index.precollect(*support, parent, *ext, *ext);
            let accepted = placeholder.ref_count() > 0;
            (placeholder, accepted)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lists_stay_sorted_and_bounded(
        patterns in proptest::collection::vec(pattern_strategy(), 1..80),
        k in 1..5usize,
    ) {
        let index = TopKIndex::new(k, false, (0..ITEMS).map(|i| (i, 500)));
        feed(&index, &patterns);

        for (item, supports) in index.support_lists() {
            prop_assert!(supports.len() <= k);
            for pair in supports.windows(2) {
                prop_assert!(pair[0] >= pair[1], "item {item} list out of order");
            }
            // The bound mirror agrees with the list tail.
            match index.bound(item) {
                Bound::NotFull => prop_assert!(supports.len() < k),
                Bound::Threshold(floor) => {
                    prop_assert_eq!(supports.len(), k);
                    prop_assert_eq!(floor, *supports.last().unwrap());
                }
                Bound::Untracked => prop_assert!(false, "item {} is tracked", item),
            }
        }
    }

    #[test]
    fn each_list_keeps_the_k_best_for_it(
        patterns in proptest::collection::vec(pattern_strategy(), 1..80),
        k in 1..5usize,
    ) {
        let index = TopKIndex::new(k, false, (0..ITEMS).map(|i| (i, 500)));
        feed(&index, &patterns);

        for (item, supports) in index.support_lists() {
            // Supports of every offered pattern containing the item,
            // descending. Ties at the cut are kept first-seen, so compare
            // support multisets only.
            let mut offered: Vec<u32> = patterns
                .iter()
                .filter(|(_, p)| p.contains(&item))
                .map(|(s, _)| *s)
                .collect();
            offered.sort_unstable_by(|a, b| b.cmp(a));
            offered.truncate(k);
            prop_assert_eq!(supports, offered, "item {}", item);
        }
    }

    #[test]
    fn refcounts_equal_list_occupancy(
        patterns in proptest::collection::vec(pattern_strategy(), 1..60),
        k in 1..4usize,
    ) {
        let index = TopKIndex::new(k, false, (0..ITEMS).map(|i| (i, 500)));
        let placeholders = feed(&index, &patterns);

        let slots_used: u64 = index
            .support_lists()
            .iter()
            .map(|(_, s)| s.len() as u64)
            .sum();
        let refs: u64 = placeholders.iter().map(|(p, _)| p.ref_count() as u64).sum();
        prop_assert_eq!(refs, slots_used);

        // Materialization follows acceptance at insert time. An accepted
        // placeholder stays materialized even after evictions drop its
        // refcount to zero.
        for (p, accepted) in &placeholders {
            prop_assert_eq!(p.items().is_some(), *accepted);
            if p.ref_count() > 0 {
                prop_assert!(p.items().is_some(), "held but never materialized");
            }
            if let Some(items) = p.items() {
                for pair in items.windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                }
                prop_assert!(items.contains(&p.extension()));
            }
        }
    }
}
