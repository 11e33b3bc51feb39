//! Error handling
//!
//! Defines the error taxonomy for the connection and command layers.

pub mod types;

pub use types::*;
