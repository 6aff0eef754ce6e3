//! Sequential reference exploration.
//!
//! A plain depth-first walk with the same admission semantics as the
//! parallel workers. Used by tests as the ground truth the scheduler's
//! output and node counts are compared against.

use std::sync::Arc;

use crate::search::{ExpansionMemo, SearchNode};
use crate::selector::{Candidate, SelectorChain};
use crate::topk::TopKIndex;

struct Frame<N> {
    node: Arc<N>,
    memo: ExpansionMemo,
}

/// Explores the tree under `root` depth-first on the calling thread,
/// reporting every admitted node to `index`. Returns the number of nodes
/// created (children yielded by `advance`, admitted or not).
pub fn explore_sequential<N: SearchNode>(
    root: Arc<N>,
    index: &TopKIndex,
    chain: &SelectorChain,
) -> u64 {
    let mut created = 0u64;
    let mut stack = vec![Frame {
        node: root,
        memo: ExpansionMemo::new(),
    }];

    while let Some(frame) = stack.last() {
        match frame.node.advance(&frame.memo) {
            Some(child) => {
                created += 1;
                let candidate = Candidate {
                    extension: child.extension(),
                    support: child.support(),
                    pattern: frame.node.pattern(),
                    memo: &frame.memo,
                };
                if !chain.allows(&candidate) {
                    continue;
                }

                let extension = child.extension();
                let closure_parent: Vec<u32> = child
                    .pattern()
                    .iter()
                    .copied()
                    .filter(|&i| i != extension)
                    .collect();
                index.precollect(
                    child.support(),
                    &closure_parent,
                    extension,
                    child.extension_original(),
                );

                stack.push(Frame {
                    node: child,
                    memo: ExpansionMemo::new(),
                });
            }
            None => {
                stack.pop();
            }
        }
    }
    created
}
