//! suppaftp-backed transport
//!
//! The production capability: every session operation maps onto one or two
//! calls of a blocking `suppaftp::FtpStream`.

use log::{debug, info, trace};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use suppaftp::FtpStream;
use suppaftp::Status;
use suppaftp::types::{FileType, FormatControl, FtpError, Mode, Response};

use crate::error::{TransportError, TransportResult};
use crate::transfer::{Direction, PendingTransfer, TransferStatus, TransferType};
use crate::transport::{
    Connector, FtpOption, FtpSession, OptionValue, SessionOptions, parse_system_type,
};

/// Connects with `suppaftp` over plain TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuppaFtpConnector;

impl Connector for SuppaFtpConnector {
    type Session = SuppaFtpSession;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> TransportResult<SuppaFtpSession> {
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        let mut last_error = None;

        for addr in addrs {
            match FtpStream::connect_timeout(addr, timeout) {
                Ok(stream) => {
                    info!("Control connection established with {}", addr);
                    return SuppaFtpSession::new(stream, timeout);
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(TransportError::from(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            TransportError::Protocol(format!("no address found for {host}:{port}"))
        }))
    }
}

/// Transport handle over a `suppaftp` control connection.
pub struct SuppaFtpSession {
    stream: FtpStream,
    options: SessionOptions,
    pending: Option<PendingTransfer>,
}

impl SuppaFtpSession {
    fn new(mut stream: FtpStream, timeout: Duration) -> TransportResult<Self> {
        // suppaftp defaults to passive; sessions start in active mode until asked otherwise
        stream.set_mode(Mode::Active);

        let session = Self {
            stream,
            options: SessionOptions::new(timeout),
            pending: None,
        };
        session.apply_timeout()?;
        Ok(session)
    }

    /// Greeting sent by the server on connect.
    pub fn welcome_message(&self) -> Option<&str> {
        self.stream.get_welcome_msg()
    }

    fn apply_timeout(&self) -> io::Result<()> {
        let timeout = Some(self.options.timeout());
        let socket = self.stream.get_ref();
        socket.set_read_timeout(timeout)?;
        socket.set_write_timeout(timeout)
    }

    /// The control stream, unless a non-blocking transfer still owns it.
    fn idle_stream(&mut self) -> TransportResult<&mut FtpStream> {
        if self.pending.is_some() {
            return Err(TransportError::TransferInProgress);
        }
        Ok(&mut self.stream)
    }

    fn prepare_transfer(&mut self, mode: TransferType, offset: u64) -> TransportResult<()> {
        let stream = self.idle_stream()?;
        stream.transfer_type(file_type(mode))?;

        if offset > 0 {
            let offset = usize::try_from(offset)
                .map_err(|_| TransportError::Protocol(format!("offset {offset} out of range")))?;
            stream.resume_transfer(offset)?;
        }
        Ok(())
    }

    fn step(&mut self, mut transfer: PendingTransfer) -> TransportResult<TransferStatus> {
        let status = match transfer.advance() {
            Ok(status) => status,
            Err(e) => {
                // Drain the server's reply so the control channel stays usable
                let _ = self.finalize(transfer);
                return Err(e.into());
            }
        };

        match status {
            TransferStatus::MoreData => {
                trace!("Non-blocking transfer at {} bytes", transfer.transferred());
                self.pending = Some(transfer);
            }
            TransferStatus::Finished => {
                debug!("Non-blocking transfer done, {} bytes", transfer.transferred());
                self.finalize(transfer)?;
            }
        }
        Ok(status)
    }

    fn finalize(&mut self, transfer: PendingTransfer) -> TransportResult<()> {
        match transfer.direction() {
            Direction::Download => {
                let (data, _sink) = transfer.into_parts();
                self.stream.finalize_retr_stream(data)?;
            }
            Direction::Upload => {
                let (_source, data) = transfer.into_parts();
                self.stream.finalize_put_stream(data)?;
            }
        }
        Ok(())
    }
}

fn file_type(mode: TransferType) -> FileType {
    match mode {
        TransferType::Ascii => FileType::Ascii(FormatControl::Default),
        TransferType::Binary => FileType::Binary,
    }
}

fn response_text(response: &Response) -> String {
    String::from_utf8_lossy(response.body.as_ref())
        .trim_end()
        .to_string()
}

impl FtpSession for SuppaFtpSession {
    fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SessionOptions {
        &mut self.options
    }

    fn login(&mut self, username: &str, password: &str) -> TransportResult<()> {
        self.idle_stream()?.login(username, password)?;
        Ok(())
    }

    /// Entering passive mode asks the server for a data address right away,
    /// so a server that refuses PASV fails here rather than on the first
    /// transfer.
    fn set_passive(&mut self, passive: bool) -> TransportResult<()> {
        let stream = self.idle_stream()?;
        if passive {
            stream.custom_command("PASV", &[Status::PassiveMode])?;
            stream.set_mode(Mode::Passive);
        } else {
            stream.set_mode(Mode::Active);
        }
        Ok(())
    }

    fn quit(&mut self) -> TransportResult<()> {
        if let Some(transfer) = self.pending.take() {
            debug!("Abandoning non-blocking transfer at {} bytes before quit", transfer.transferred());
            // The transfer reply must be read or QUIT would get it
            if let Err(e) = self.finalize(transfer) {
                debug!("Abandoned transfer ended with: {}", e);
            }
        }
        self.stream.quit()?;
        Ok(())
    }

    fn fget(
        &mut self,
        sink: &mut dyn Write,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<()> {
        self.prepare_transfer(mode, resume_pos)?;
        let mut data = self.stream.retr_as_stream(remote_file)?;
        let bytes = match io::copy(&mut data, sink) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(reply) = self.stream.finalize_retr_stream(data) {
                    debug!("Interrupted download of {} ended with: {}", remote_file, reply);
                }
                return Err(e.into());
            }
        };
        self.stream.finalize_retr_stream(data)?;
        debug!("Downloaded {} ({} bytes)", remote_file, bytes);
        Ok(())
    }

    fn fput(
        &mut self,
        remote_file: &str,
        source: &mut dyn Read,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<()> {
        self.prepare_transfer(mode, start_pos)?;
        let mut data = self.stream.put_with_stream(remote_file)?;
        let bytes = match io::copy(source, &mut data) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(reply) = self.stream.finalize_put_stream(data) {
                    debug!("Interrupted upload of {} ended with: {}", remote_file, reply);
                }
                return Err(e.into());
            }
        };
        self.stream.finalize_put_stream(data)?;
        debug!("Uploaded {} ({} bytes)", remote_file, bytes);
        Ok(())
    }

    fn fget_nb(
        &mut self,
        sink: Box<dyn Write + Send>,
        remote_file: &str,
        mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<TransferStatus> {
        self.prepare_transfer(mode, resume_pos)?;
        let data = self.stream.retr_as_stream(remote_file)?;
        self.step(PendingTransfer::download(Box::new(data), sink))
    }

    fn fput_nb(
        &mut self,
        remote_file: &str,
        source: Box<dyn Read + Send>,
        mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<TransferStatus> {
        self.prepare_transfer(mode, start_pos)?;
        let data = self.stream.put_with_stream(remote_file)?;
        self.step(PendingTransfer::upload(source, Box::new(data)))
    }

    fn nb_continue(&mut self) -> TransportResult<TransferStatus> {
        let transfer = self
            .pending
            .take()
            .ok_or(TransportError::NoPendingTransfer)?;
        self.step(transfer)
    }

    fn set_option(&mut self, option: FtpOption, value: OptionValue) -> TransportResult<()> {
        self.options.set(option, value)?;
        match option {
            FtpOption::TimeoutSec => self.apply_timeout()?,
            FtpOption::UsePasvAddress => self
                .stream
                .set_passive_nat_workaround(!self.options.use_pasv_address()),
            FtpOption::AutoSeek => {}
        }
        Ok(())
    }

    fn cdup(&mut self) -> TransportResult<()> {
        self.idle_stream()?.cdup()?;
        Ok(())
    }

    fn chdir(&mut self, directory: &str) -> TransportResult<()> {
        self.idle_stream()?.cwd(directory)?;
        Ok(())
    }

    fn mkdir(&mut self, directory: &str) -> TransportResult<String> {
        self.idle_stream()?.mkdir(directory)?;
        Ok(directory.to_string())
    }

    fn rmdir(&mut self, directory: &str) -> TransportResult<()> {
        self.idle_stream()?.rmdir(directory)?;
        Ok(())
    }

    fn nlist(&mut self, directory: &str) -> TransportResult<Vec<String>> {
        Ok(self.idle_stream()?.nlst(Some(directory))?)
    }

    fn rawlist(&mut self, directory: &str, recursive: bool) -> TransportResult<Vec<String>> {
        let stream = self.idle_stream()?;
        let lines = if recursive {
            let argument = format!("-R {directory}");
            stream.list(Some(argument.as_str()))?
        } else {
            stream.list(Some(directory))?
        };
        Ok(lines)
    }

    fn pwd(&mut self) -> TransportResult<String> {
        Ok(self.idle_stream()?.pwd()?)
    }

    fn raw(&mut self, command: &str) -> TransportResult<Vec<String>> {
        let response = match self.idle_stream()?.custom_command(command, &[]) {
            Ok(response) => response,
            // any reply is a valid answer to a raw command
            Err(FtpError::UnexpectedResponse(response)) => response,
            Err(e) => return Err(e.into()),
        };
        Ok(response_text(&response)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn exec(&mut self, command: &str) -> TransportResult<()> {
        self.idle_stream()?.site(format!("EXEC {command}"))?;
        Ok(())
    }

    fn alloc(&mut self, size: u64) -> TransportResult<String> {
        let response = self.idle_stream()?.custom_command(
            format!("ALLO {size}"),
            &[Status::CommandOk, Status::CommandNotImplemented],
        )?;
        Ok(response_text(&response))
    }

    fn chmod(&mut self, mode: u32, file: &str) -> TransportResult<u32> {
        self.idle_stream()?.site(format!("CHMOD {mode:o} {file}"))?;
        Ok(mode)
    }

    fn rename(&mut self, from: &str, to: &str) -> TransportResult<()> {
        self.idle_stream()?.rename(from, to)?;
        Ok(())
    }

    fn delete(&mut self, path: &str) -> TransportResult<()> {
        self.idle_stream()?.rm(path)?;
        Ok(())
    }

    fn mdtm(&mut self, file: &str) -> TransportResult<i64> {
        let modified = self.idle_stream()?.mdtm(file)?;
        Ok(modified.and_utc().timestamp())
    }

    fn size(&mut self, file: &str) -> TransportResult<u64> {
        let size = self.idle_stream()?.size(file)?;
        Ok(size as u64)
    }

    fn systype(&mut self) -> TransportResult<String> {
        let response = self
            .idle_stream()?
            .custom_command("SYST", &[Status::Name])?;
        parse_system_type(&response_text(&response))
    }
}
