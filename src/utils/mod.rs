//! Utility functions
//!
//! Logging setup shared by the binary and the tests.

pub mod logging;

pub use logging::{setup_logging, setup_test_logging};
