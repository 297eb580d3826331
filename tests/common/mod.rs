#![allow(dead_code, unused_imports)]

pub use taskgraph_test_utils::init_tracing;
pub use taskgraph_test_utils::recorder::{Event, Recorder};

/// Position of `name` in `order`, panicking with context if absent.
pub fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
}
