// crates/test-utils/src/lib.rs

//! Shared helpers for `taskgraph` integration tests.

pub mod builders;
pub mod recorder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use taskgraph::logging::filter_from_env;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for one `run_concurrent` call in a test.
pub const RUN_DEADLINE: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Honours `TASKGRAPH_LOG` like the binary does, falling back to `warn` so
/// passing tests stay quiet. Output shows up only for failing tests unless
/// run with `--nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = filter_from_env().unwrap_or_else(|| EnvFilter::new("warn"));
        // Another subscriber may already be installed by the harness.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await a concurrent run, failing the test if it exceeds [`RUN_DEADLINE`].
///
/// A scheduler that loses a completion would otherwise hang the test binary.
pub async fn within_run_deadline<F, T>(run: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_DEADLINE, run).await {
        Ok(out) => out,
        Err(_) => panic!("concurrent run did not finish within {RUN_DEADLINE:?}"),
    }
}
