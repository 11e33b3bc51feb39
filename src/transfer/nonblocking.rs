//! Caller-driven chunked transfers
//!
//! A `PendingTransfer` moves bytes from a source to a sink one chunk per
//! call. The session that owns it keeps it between `nb_continue` calls and
//! finalizes the data stream once it reports `Finished`.

use std::io::{self, ErrorKind, Read, Write};

use crate::transfer::TransferStatus;

/// Bytes moved by a single non-blocking step.
pub const NB_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

pub struct PendingTransfer {
    direction: Direction,
    source: Box<dyn Read + Send>,
    sink: Box<dyn Write + Send>,
    buffer: Vec<u8>,
    transferred: u64,
}

impl PendingTransfer {
    /// Remote data stream into a local sink.
    pub fn download(data: Box<dyn Read + Send>, sink: Box<dyn Write + Send>) -> Self {
        Self::new(Direction::Download, data, sink)
    }

    /// Local source into a remote data stream.
    pub fn upload(source: Box<dyn Read + Send>, data: Box<dyn Write + Send>) -> Self {
        Self::new(Direction::Upload, source, data)
    }

    fn new(direction: Direction, source: Box<dyn Read + Send>, sink: Box<dyn Write + Send>) -> Self {
        Self {
            direction,
            source,
            sink,
            buffer: vec![0; NB_CHUNK_SIZE],
            transferred: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Moves at most one chunk.
    ///
    /// Returns `Finished` once the source is exhausted and the sink flushed.
    /// A source shorter than one chunk finishes in a single call.
    pub fn advance(&mut self) -> io::Result<TransferStatus> {
        let mut moved = 0;

        loop {
            let n = match self.source.read(&mut self.buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if n == 0 {
                self.sink.flush()?;
                return Ok(TransferStatus::Finished);
            }

            self.sink.write_all(&self.buffer[..n])?;
            self.transferred += n as u64;
            moved += n;

            if moved >= self.buffer.len() {
                return Ok(TransferStatus::MoreData);
            }
        }
    }

    /// Gives back both ends so the data stream can be finalized.
    pub fn into_parts(self) -> (Box<dyn Read + Send>, Box<dyn Write + Send>) {
        (self.source, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_small_source_finishes_in_one_step() {
        let sink = Shared::default();
        let mut transfer =
            PendingTransfer::download(Box::new(Cursor::new(b"hello".to_vec())), Box::new(sink.clone()));

        assert_eq!(transfer.advance().unwrap(), TransferStatus::Finished);
        assert_eq!(transfer.transferred(), 5);
        assert_eq!(sink.0.lock().unwrap().as_slice(), b"hello");
    }

    #[test]
    fn test_empty_source_finishes_immediately() {
        let sink = Shared::default();
        let mut transfer = PendingTransfer::upload(Box::new(io::empty()), Box::new(sink.clone()));

        assert_eq!(transfer.advance().unwrap(), TransferStatus::Finished);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_large_source_needs_continuation() {
        let data: Vec<u8> = (0..NB_CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let sink = Shared::default();
        let mut transfer =
            PendingTransfer::upload(Box::new(Cursor::new(data.clone())), Box::new(sink.clone()));

        let mut steps = 1;
        let mut status = transfer.advance().unwrap();
        assert_eq!(status, TransferStatus::MoreData);
        while status == TransferStatus::MoreData {
            status = transfer.advance().unwrap();
            steps += 1;
        }

        assert_eq!(steps, 4);
        assert_eq!(transfer.transferred(), data.len() as u64);
        assert_eq!(*sink.0.lock().unwrap(), data);
    }
}
