//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::{Builder, Env};

/// Setup logging for the client tools.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn setup_logging() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Logger for tests; safe to call from every test.
pub fn setup_test_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
