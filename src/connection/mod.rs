//! Connection lifecycle
//!
//! Owns the transport handle of one FTP session and guards its open/close
//! transitions.

pub mod core;
pub mod state;

pub use self::core::{Connection, FtpConnection, SharedConnection};
pub use state::ConnectionState;
