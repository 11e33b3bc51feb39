//! Client operations
//!
//! One thin method per FTP operation, each routed through `Client::invoke`.

use std::io::{Read, Write};
use std::path::Path;

use crate::client::Client;
use crate::error::FtpClientError;
use crate::transfer::{TransferStatus, TransferType};
use crate::transport::{Connector, FtpOption, FtpSession, OptionValue};

type ClientResult<T> = Result<T, FtpClientError>;

impl<C: Connector> Client<C> {
    // --------------------
    // Downloads
    // --------------------

    /// Downloads `remote_file` into `local_file`.
    pub fn get(
        &self,
        local_file: impl AsRef<Path>,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> ClientResult<()> {
        self.invoke("get", |s| {
            s.get(local_file.as_ref(), remote_file, mode, resume_pos)
        })
    }

    /// Starts a non-blocking download into `local_file`.
    pub fn get_nb(
        &self,
        local_file: impl AsRef<Path>,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> ClientResult<TransferStatus> {
        self.invoke("get_nb", |s| {
            s.get_nb(local_file.as_ref(), remote_file, mode, resume_pos)
        })
    }

    /// Downloads `remote_file` into an open writer.
    pub fn fget<W: Write>(
        &self,
        sink: &mut W,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> ClientResult<()> {
        self.invoke("fget", |s| s.fget(sink, remote_file, mode, resume_pos))
    }

    /// Starts a non-blocking download into a writer the session keeps until
    /// the transfer finishes.
    pub fn fget_nb<W: Write + Send + 'static>(
        &self,
        sink: W,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> ClientResult<TransferStatus> {
        self.invoke("fget_nb", |s| {
            s.fget_nb(Box::new(sink), remote_file, mode, resume_pos)
        })
    }

    /// Advances the pending non-blocking transfer by one chunk.
    pub fn nb_continue(&self) -> ClientResult<TransferStatus> {
        self.invoke("nb_continue", |s| s.nb_continue())
    }

    // --------------------
    // Uploads
    // --------------------

    /// Uploads `local_file` to `remote_file`.
    pub fn put(
        &self,
        remote_file: &str,
        local_file: impl AsRef<Path>,
        mode: TransferType,
        start_pos: u64,
    ) -> ClientResult<()> {
        self.invoke("put", |s| {
            s.put(remote_file, local_file.as_ref(), mode, start_pos)
        })
    }

    pub fn put_nb(
        &self,
        remote_file: &str,
        local_file: impl AsRef<Path>,
        mode: TransferType,
        start_pos: u64,
    ) -> ClientResult<TransferStatus> {
        self.invoke("put_nb", |s| {
            s.put_nb(remote_file, local_file.as_ref(), mode, start_pos)
        })
    }

    pub fn fput<R: Read>(
        &self,
        remote_file: &str,
        source: &mut R,
        mode: TransferType,
        start_pos: u64,
    ) -> ClientResult<()> {
        self.invoke("fput", |s| s.fput(remote_file, source, mode, start_pos))
    }

    pub fn fput_nb<R: Read + Send + 'static>(
        &self,
        remote_file: &str,
        source: R,
        mode: TransferType,
        start_pos: u64,
    ) -> ClientResult<TransferStatus> {
        self.invoke("fput_nb", |s| {
            s.fput_nb(remote_file, Box::new(source), mode, start_pos)
        })
    }

    // --------------------
    // Options
    // --------------------

    pub fn get_option(&self, option: FtpOption) -> ClientResult<OptionValue> {
        self.invoke("get_option", |s| s.get_option(option))
    }

    pub fn set_option(&self, option: FtpOption, value: OptionValue) -> ClientResult<()> {
        self.invoke("set_option", |s| s.set_option(option, value))
    }

    // --------------------
    // Directories
    // --------------------

    pub fn cdup(&self) -> ClientResult<()> {
        self.invoke("cdup", |s| s.cdup())
    }

    pub fn chdir(&self, directory: &str) -> ClientResult<()> {
        self.invoke("chdir", |s| s.chdir(directory))
    }

    /// Creates `directory`, returning its name as reported by the session.
    pub fn mkdir(&self, directory: &str) -> ClientResult<String> {
        self.invoke("mkdir", |s| s.mkdir(directory))
    }

    pub fn rmdir(&self, directory: &str) -> ClientResult<()> {
        self.invoke("rmdir", |s| s.rmdir(directory))
    }

    pub fn nlist(&self, directory: &str) -> ClientResult<Vec<String>> {
        self.invoke("nlist", |s| s.nlist(directory))
    }

    pub fn rawlist(&self, directory: &str, recursive: bool) -> ClientResult<Vec<String>> {
        self.invoke("rawlist", |s| s.rawlist(directory, recursive))
    }

    pub fn pwd(&self) -> ClientResult<String> {
        self.invoke("pwd", |s| s.pwd())
    }

    // --------------------
    // Commands
    // --------------------

    /// Sends a command line as-is and returns the reply lines.
    pub fn raw(&self, command: &str) -> ClientResult<Vec<String>> {
        self.invoke("raw", |s| s.raw(command))
    }

    pub fn exec(&self, command: &str) -> ClientResult<()> {
        self.invoke("exec", |s| s.exec(command))
    }

    pub fn alloc(&self, size: u64) -> ClientResult<String> {
        self.invoke("alloc", |s| s.alloc(size))
    }

    pub fn chmod(&self, mode: u32, file: &str) -> ClientResult<u32> {
        self.invoke("chmod", |s| s.chmod(mode, file))
    }

    pub fn rename(&self, from: &str, to: &str) -> ClientResult<()> {
        self.invoke("rename", |s| s.rename(from, to))
    }

    pub fn delete(&self, path: &str) -> ClientResult<()> {
        self.invoke("delete", |s| s.delete(path))
    }

    pub fn mdtm(&self, file: &str) -> ClientResult<i64> {
        self.invoke("mdtm", |s| s.mdtm(file))
    }

    pub fn pasv(&self, passive: bool) -> ClientResult<()> {
        self.invoke("pasv", |s| s.set_passive(passive))
    }

    pub fn size(&self, file: &str) -> ClientResult<u64> {
        self.invoke("size", |s| s.size(file))
    }

    pub fn systype(&self) -> ClientResult<String> {
        self.invoke("systype", |s| s.systype())
    }
}
