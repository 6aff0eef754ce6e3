//! Determinism of the full pipeline across worker counts.

use std::sync::Arc;

use proptest::prelude::*;

use miner_rs::sim::{explore_sequential, SyntheticNode, TreeShape};
use miner_rs::{Miner, MinerConfig, SelectorChain, TopKIndex, VecPatternSink};

fn shape_strategy() -> impl Strategy<Value = TreeShape> {
    (2..=14u32, 10..=150u32, 1..=5usize, any::<u64>()).prop_map(
        |(items, root_support, max_depth, seed)| TreeShape {
            items,
            root_support,
            max_depth,
            seed,
            ..TreeShape::default()
        },
    )
}

fn run(shape: TreeShape, workers: usize, k: usize) -> (Vec<(u32, Vec<u32>)>, u64) {
    let miner = Miner::new(MinerConfig::new(workers, k)).unwrap();
    let index = Arc::new(TopKIndex::new(
        k,
        false,
        (0..shape.items).map(|i| (i, shape.root_support)),
    ));
    let sink = VecPatternSink::new();
    let report = miner
        .run_with_chain(
            SyntheticNode::root(shape),
            Arc::clone(&index),
            SelectorChain::new(),
            &sink,
        )
        .unwrap();
    (index.support_lists(), report.counters.nodes_created)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn results_are_worker_count_invariant(shape in shape_strategy(), k in 1..4usize) {
        let reference_index = TopKIndex::new(
            k,
            false,
            (0..shape.items).map(|i| (i, shape.root_support)),
        );
        let expected_nodes = explore_sequential(
            SyntheticNode::root(shape),
            &reference_index,
            &SelectorChain::new(),
        );
        let expected_lists = reference_index.support_lists();

        for workers in [1usize, 3] {
            let (lists, created) = run(shape, workers, k);
            prop_assert_eq!(created, expected_nodes, "workers={}", workers);
            prop_assert_eq!(&lists, &expected_lists, "workers={}", workers);
        }
    }

    #[test]
    fn pruned_runs_preserve_the_lists(shape in shape_strategy(), k in 1..4usize) {
        let (unpruned, _) = run(shape, 1, k);

        let miner = Miner::new(MinerConfig::new(2, k)).unwrap();
        let index = Arc::new(TopKIndex::new(
            k,
            false,
            (0..shape.items).map(|i| (i, shape.root_support)),
        ));
        let sink = VecPatternSink::new();
        miner
            .run(
                SyntheticNode::root(shape),
                Arc::clone(&index),
                Vec::new(),
                &sink,
            )
            .unwrap();
        prop_assert_eq!(index.support_lists(), unpruned);
    }
}
