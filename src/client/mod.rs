//! Command client
//!
//! Forwards named FTP operations to the session of a shared `Connection`,
//! opening it on first use and translating every operation failure into a
//! `CommandError`.

pub mod core;
pub mod operations;

pub use self::core::Client;
