//! Property tests: randomized inputs against structural invariants.

mod determinism;
mod topk_invariant;
