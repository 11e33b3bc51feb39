//! Transfer module for the FTP client
//!
//! Local file positioning, transfer representation types and the chunked
//! state used by non-blocking transfers.

pub mod local;
pub mod modes;
pub mod nonblocking;
pub mod results;

pub use local::{open_download_target, open_upload_source};
pub use modes::{DataConnectionMode, TransferType};
pub use nonblocking::{Direction, NB_CHUNK_SIZE, PendingTransfer};
pub use results::TransferStatus;
