//! FTP capability seam
//!
//! A `Connector` opens control connections and hands back an `FtpSession`,
//! the transport handle owned by a `Connection`. The command client only
//! ever talks to the session through this trait.

pub mod memory;
pub mod options;
pub mod stream;

pub use memory::{MemoryConnector, MemoryServer, MemorySession};
pub use options::{FtpOption, OptionValue, SessionOptions};
pub use stream::{SuppaFtpConnector, SuppaFtpSession};

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::{TransportError, TransportResult};
use crate::transfer::{TransferStatus, TransferType, open_download_target, open_upload_source};

/// Opens control connections.
///
/// Connections and their sessions may move between threads, so shared
/// clients can be used from any of them.
pub trait Connector: Send {
    type Session: FtpSession + Send;

    /// Whether the capability can be used at all in this environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Connects to `host:port`. The returned session is not logged in yet.
    fn connect(&self, host: &str, port: u16, timeout: Duration) -> TransportResult<Self::Session>;
}

/// A live control connection and every operation it can carry.
pub trait FtpSession {
    fn options(&self) -> &SessionOptions;

    fn options_mut(&mut self) -> &mut SessionOptions;

    fn login(&mut self, username: &str, password: &str) -> TransportResult<()>;

    fn set_passive(&mut self, passive: bool) -> TransportResult<()>;

    /// Ends the session with the server.
    fn quit(&mut self) -> TransportResult<()>;

    // --------------------
    // Transfers
    // --------------------

    /// Downloads `remote_file` into `sink`, asking the server to skip
    /// `resume_pos` bytes.
    fn fget(
        &mut self,
        sink: &mut dyn Write,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<()>;

    /// Uploads `source` to `remote_file`, starting at server offset
    /// `start_pos`.
    fn fput(
        &mut self,
        remote_file: &str,
        source: &mut dyn Read,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<()>;

    /// Starts a chunked download; see `nb_continue`.
    fn fget_nb(
        &mut self,
        sink: Box<dyn Write + Send>,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<TransferStatus>;

    /// Starts a chunked upload; see `nb_continue`.
    fn fput_nb(
        &mut self,
        remote_file: &str,
        source: Box<dyn Read + Send>,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<TransferStatus>;

    /// Moves the next chunk of the pending non-blocking transfer.
    fn nb_continue(&mut self) -> TransportResult<TransferStatus>;

    fn get(
        &mut self,
        local_file: &Path,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<()> {
        let mut file = open_download_target(local_file, resume_pos, self.options().autoseek())?;
        self.fget(&mut file, remote_file, mode, resume_pos)
    }

    fn put(
        &mut self,
        remote_file: &str,
        local_file: &Path,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<()> {
        let mut file = open_upload_source(local_file, start_pos, self.options().autoseek())?;
        self.fput(remote_file, &mut file, mode, start_pos)
    }

    fn get_nb(
        &mut self,
        local_file: &Path,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<TransferStatus> {
        let file = open_download_target(local_file, resume_pos, self.options().autoseek())?;
        self.fget_nb(Box::new(file), remote_file, mode, resume_pos)
    }

    fn put_nb(
        &mut self,
        remote_file: &str,
        local_file: &Path,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<TransferStatus> {
        let file = open_upload_source(local_file, start_pos, self.options().autoseek())?;
        self.fput_nb(remote_file, Box::new(file), mode, start_pos)
    }

    // --------------------
    // Options
    // --------------------

    fn get_option(&self, option: FtpOption) -> TransportResult<OptionValue> {
        Ok(self.options().get(option))
    }

    fn set_option(&mut self, option: FtpOption, value: OptionValue) -> TransportResult<()> {
        self.options_mut().set(option, value)
    }

    // --------------------
    // Directories and files
    // --------------------

    fn cdup(&mut self) -> TransportResult<()>;

    fn chdir(&mut self, directory: &str) -> TransportResult<()>;

    /// Returns the name of the created directory.
    fn mkdir(&mut self, directory: &str) -> TransportResult<String>;

    fn rmdir(&mut self, directory: &str) -> TransportResult<()>;

    fn nlist(&mut self, directory: &str) -> TransportResult<Vec<String>>;

    fn rawlist(&mut self, directory: &str, recursive: bool) -> TransportResult<Vec<String>>;

    fn pwd(&mut self) -> TransportResult<String>;

    /// Sends `command` verbatim and returns the reply lines, whatever the
    /// reply code.
    fn raw(&mut self, command: &str) -> TransportResult<Vec<String>>;

    /// `SITE EXEC`
    fn exec(&mut self, command: &str) -> TransportResult<()>;

    /// `ALLO`; returns the server's message.
    fn alloc(&mut self, size: u64) -> TransportResult<String>;

    /// `SITE CHMOD`; returns the mode that was set.
    fn chmod(&mut self, mode: u32, file: &str) -> TransportResult<u32>;

    fn rename(&mut self, from: &str, to: &str) -> TransportResult<()>;

    fn delete(&mut self, path: &str) -> TransportResult<()>;

    /// Last modification time as a unix timestamp.
    fn mdtm(&mut self, file: &str) -> TransportResult<i64>;

    fn size(&mut self, file: &str) -> TransportResult<u64>;

    /// First word of the `SYST` reply, e.g. `UNIX`.
    fn systype(&mut self) -> TransportResult<String>;
}

/// Extracts the system type word from a `SYST` reply body.
pub fn parse_system_type(reply: &str) -> TransportResult<String> {
    let text = reply.trim();
    let text = match text.get(..3) {
        Some(code) if code.bytes().all(|b| b.is_ascii_digit()) => text[3..].trim_start_matches('-'),
        _ => text,
    };

    text.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| TransportError::Protocol(format!("malformed SYST reply: {reply}")))
}
