//! Tracing initialization for tests and benches.

use std::sync::Once;

/// Install a test-friendly tracing subscriber once per process.
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=simufisc_engine=debug`.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
