//! RAX FTP Client
//!
//! A connection lifecycle guard and command layer over an FTP transport.
//!
//! ```no_run
//! use rax_ftp_client::{Client, ConnectionConfig, FtpConnection, TransferType};
//!
//! let config = ConnectionConfig::new("ftp.example.com", "user", "secret").with_passive(true);
//! let client = Client::from_connection(FtpConnection::new(config)?);
//!
//! client.put("/upload.bin", "local.bin", TransferType::Binary, 0)?;
//! for name in client.nlist("/")? {
//!     println!("{name}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod transfer;
pub mod transport;
pub mod utils;

pub use client::Client;
pub use config::ConnectionConfig;
pub use connection::{Connection, ConnectionState, FtpConnection, SharedConnection};
pub use error::{CommandError, ConnectionError, FtpClientError, TransportError};
pub use transfer::{TransferStatus, TransferType};
pub use transport::{
    Connector, FtpOption, FtpSession, MemoryConnector, MemoryServer, OptionValue,
    SuppaFtpConnector,
};
