//! Integration tests: whole-crate flows through the public API.

mod sinks;
mod topk_scenarios;

/// Call first in tests whose log output matters; safe to call repeatedly.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}
