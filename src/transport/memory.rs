//! In-memory transport
//!
//! A `MemoryServer` keeps a tiny virtual file system and a set of accounts.
//! Sessions opened through a `MemoryConnector` operate on it directly, which
//! makes the whole client usable without a network. Failure switches cover
//! the lifecycle paths (unreachable host, passive mode refused, failing
//! quit, capability missing).

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Cursor, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{TransportError, TransportResult};
use crate::transfer::{DataConnectionMode, PendingTransfer, TransferStatus, TransferType};
use crate::transport::{Connector, FtpSession, SessionOptions};

#[derive(Debug, Clone)]
struct RemoteFile {
    content: Vec<u8>,
    mode: u32,
    modified: i64,
}

#[derive(Debug)]
struct ServerState {
    files: BTreeMap<String, RemoteFile>,
    directories: BTreeSet<String>,
    accounts: HashMap<String, String>,
    reachable: bool,
    passive_supported: bool,
    fail_quit: bool,
    open_sessions: usize,
    total_connects: usize,
    quits: usize,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            directories: BTreeSet::from(["/".to_string()]),
            accounts: HashMap::new(),
            reachable: true,
            passive_supported: true,
            fail_quit: false,
            open_sessions: 0,
            total_connects: 0,
            quits: 0,
        }
    }
}

/// Shared in-memory FTP server. Clones refer to the same server.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_account(self, username: &str, password: &str) -> Self {
        self.lock()
            .accounts
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Refuse every connection attempt.
    pub fn unreachable(self) -> Self {
        self.lock().reachable = false;
        self
    }

    /// Refuse to enter passive mode.
    pub fn without_passive(self) -> Self {
        self.lock().passive_supported = false;
        self
    }

    /// Make `QUIT` fail.
    pub fn set_fail_quit(&self, fail: bool) {
        self.lock().fail_quit = fail;
    }

    /// Sessions currently holding a control connection.
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    /// Connections accepted since the server was created.
    pub fn total_connects(&self) -> usize {
        self.lock().total_connects
    }

    /// `QUIT` commands acknowledged since the server was created.
    pub fn quits(&self) -> usize {
        self.lock().quits
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).map(|f| f.content.clone())
    }

    pub fn insert_file(&self, path: &str, content: &[u8]) {
        self.lock().store(path, content.to_vec());
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.lock().directories.contains(path)
    }
}

impl ServerState {
    fn store(&mut self, path: &str, content: Vec<u8>) {
        let mode = self.files.get(path).map_or(0o644, |f| f.mode);
        self.files.insert(
            path.to_string(),
            RemoteFile {
                content,
                mode,
                modified: now(),
            },
        );
    }

    fn is_empty_directory(&self, path: &str) -> bool {
        let prefix = child_prefix(path);
        !self.files.keys().any(|p| p.starts_with(&prefix))
            && !self.directories.iter().any(|d| d.starts_with(&prefix))
    }

    /// Direct children of `dir`: (name, is_directory)
    fn children(&self, dir: &str) -> Vec<(String, bool)> {
        let prefix = child_prefix(dir);
        let direct = |path: &String| {
            path.strip_prefix(&prefix)
                .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                .map(str::to_string)
        };

        let mut entries: Vec<(String, bool)> = self
            .directories
            .iter()
            .filter_map(|d| direct(d).map(|name| (name, true)))
            .chain(
                self.files
                    .keys()
                    .filter_map(|f| direct(f).map(|name| (name, false))),
            )
            .collect();
        entries.sort();
        entries
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn child_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{dir}/")
    }
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn not_found(path: &str) -> TransportError {
    TransportError::reply(550, format!("{path}: No such file or directory"))
}

/// Opens sessions on a `MemoryServer`.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    server: MemoryServer,
    available: bool,
}

impl MemoryConnector {
    pub fn new(server: MemoryServer) -> Self {
        Self {
            server,
            available: true,
        }
    }

    /// A connector whose capability is missing from the environment.
    pub fn unavailable(server: MemoryServer) -> Self {
        Self {
            server,
            available: false,
        }
    }

    pub fn server(&self) -> &MemoryServer {
        &self.server
    }
}

impl Connector for MemoryConnector {
    type Session = MemorySession;

    fn is_available(&self) -> bool {
        self.available
    }

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> TransportResult<MemorySession> {
        let mut state = self.server.lock();
        if !state.reachable {
            return Err(TransportError::Io(io::Error::new(
                ErrorKind::ConnectionRefused,
                format!("{host}:{port} refused the connection"),
            )));
        }
        state.open_sessions += 1;
        state.total_connects += 1;
        drop(state);

        debug!("Memory session opened for {}:{}", host, port);
        Ok(MemorySession {
            server: self.server.clone(),
            options: SessionOptions::new(timeout),
            logged_in: false,
            mode: DataConnectionMode::Active,
            cwd: "/".to_string(),
            pending: None,
        })
    }
}

/// Buffer shared between a pending upload and the session finalizing it.
#[derive(Clone, Default)]
struct UploadBuffer(Arc<Mutex<Vec<u8>>>);

impl UploadBuffer {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Write for UploadBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct PendingUpload {
    path: String,
    start_pos: u64,
    buffer: UploadBuffer,
}

/// Transport handle on a `MemoryServer`.
pub struct MemorySession {
    server: MemoryServer,
    options: SessionOptions,
    logged_in: bool,
    mode: DataConnectionMode,
    cwd: String,
    pending: Option<(PendingTransfer, Option<PendingUpload>)>,
}

impl MemorySession {
    pub fn data_mode(&self) -> DataConnectionMode {
        self.mode
    }

    pub fn is_passive(&self) -> bool {
        self.mode.is_passive()
    }

    /// Absolute, normalized form of `path` relative to the working directory.
    fn resolve(&self, path: &str) -> String {
        let joined = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{}/{}", self.cwd, path)
        };

        let mut parts: Vec<&str> = Vec::new();
        for part in joined.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        format!("/{}", parts.join("/"))
    }

    fn ready(&self) -> TransportResult<()> {
        if !self.logged_in {
            return Err(TransportError::reply(530, "Not logged in."));
        }
        if self.pending.is_some() {
            return Err(TransportError::TransferInProgress);
        }
        Ok(())
    }

    fn read_file(&self, remote_file: &str, offset: u64) -> TransportResult<Vec<u8>> {
        self.ready()?;
        let path = self.resolve(remote_file);
        let state = self.server.lock();
        let file = state.files.get(&path).ok_or_else(|| not_found(remote_file))?;
        let start = (offset as usize).min(file.content.len());
        Ok(file.content[start..].to_vec())
    }

    fn write_file(&self, path: &str, start_pos: u64, data: Vec<u8>) -> TransportResult<()> {
        let mut state = self.server.lock();
        if !state.directories.contains(&parent_of(path)) {
            return Err(not_found(path));
        }

        let mut content = if start_pos > 0 {
            state
                .files
                .get(path)
                .map(|f| f.content.clone())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        content.truncate(start_pos as usize);
        content.extend_from_slice(&data);
        state.store(path, content);
        Ok(())
    }

    fn step(
        &mut self,
        mut transfer: PendingTransfer,
        upload: Option<PendingUpload>,
    ) -> TransportResult<TransferStatus> {
        let status = transfer.advance()?;
        match status {
            TransferStatus::MoreData => self.pending = Some((transfer, upload)),
            TransferStatus::Finished => {
                if let Some(upload) = upload {
                    self.write_file(&upload.path, upload.start_pos, upload.buffer.take())?;
                }
            }
        }
        Ok(status)
    }

    fn listing_line(&self, name: &str, path: &str, is_dir: bool) -> String {
        let state = self.server.lock();
        match state.files.get(path) {
            Some(file) if !is_dir => format!(
                "-{} 1 ftp ftp {:>8} Jan 01 00:00 {}",
                permissions(file.mode),
                file.content.len(),
                name
            ),
            _ => format!("d{} 2 ftp ftp {:>8} Jan 01 00:00 {}", permissions(0o755), 0, name),
        }
    }
}

fn permissions(mode: u32) -> String {
    let flags = ['r', 'w', 'x'];
    (0..9)
        .map(|bit| {
            if mode & (0o400 >> bit) != 0 {
                flags[bit % 3]
            } else {
                '-'
            }
        })
        .collect()
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        let mut state = self.server.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
    }
}

impl FtpSession for MemorySession {
    fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SessionOptions {
        &mut self.options
    }

    fn login(&mut self, username: &str, password: &str) -> TransportResult<()> {
        let accepted = self
            .server
            .lock()
            .accounts
            .get(username)
            .is_some_and(|expected| expected == password);
        if !accepted {
            return Err(TransportError::reply(530, "Login incorrect."));
        }
        self.logged_in = true;
        Ok(())
    }

    fn set_passive(&mut self, passive: bool) -> TransportResult<()> {
        if passive && !self.server.lock().passive_supported {
            return Err(TransportError::reply(502, "PASV not implemented."));
        }
        self.mode = DataConnectionMode::from_passive(passive);
        Ok(())
    }

    fn quit(&mut self) -> TransportResult<()> {
        let mut state = self.server.lock();
        if state.fail_quit {
            return Err(TransportError::Io(io::Error::new(
                ErrorKind::BrokenPipe,
                "control connection lost",
            )));
        }
        state.quits += 1;
        drop(state);

        self.pending = None;
        self.logged_in = false;
        Ok(())
    }

    fn fget(
        &mut self,
        sink: &mut dyn Write,
        remote_file: &str,
        _mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<()> {
        let content = self.read_file(remote_file, resume_pos)?;
        sink.write_all(&content)?;
        sink.flush()?;
        Ok(())
    }

    fn fput(
        &mut self,
        remote_file: &str,
        source: &mut dyn Read,
        _mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<()> {
        self.ready()?;
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        let path = self.resolve(remote_file);
        self.write_file(&path, start_pos, data)
    }

    fn fget_nb(
        &mut self,
        sink: Box<dyn Write + Send>,
        remote_file: &str,
        _mode: TransferType,
        resume_pos: u64,
    ) -> TransportResult<TransferStatus> {
        let content = self.read_file(remote_file, resume_pos)?;
        let transfer = PendingTransfer::download(Box::new(Cursor::new(content)), sink);
        self.step(transfer, None)
    }

    fn fput_nb(
        &mut self,
        remote_file: &str,
        source: Box<dyn Read + Send>,
        _mode: TransferType,
        start_pos: u64,
    ) -> TransportResult<TransferStatus> {
        self.ready()?;
        let upload = PendingUpload {
            path: self.resolve(remote_file),
            start_pos,
            buffer: UploadBuffer::default(),
        };
        let transfer = PendingTransfer::upload(source, Box::new(upload.buffer.clone()));
        self.step(transfer, Some(upload))
    }

    fn nb_continue(&mut self) -> TransportResult<TransferStatus> {
        let (transfer, upload) = self
            .pending
            .take()
            .ok_or(TransportError::NoPendingTransfer)?;
        self.step(transfer, upload)
    }

    fn cdup(&mut self) -> TransportResult<()> {
        self.ready()?;
        self.cwd = parent_of(&self.cwd);
        Ok(())
    }

    fn chdir(&mut self, directory: &str) -> TransportResult<()> {
        self.ready()?;
        let path = self.resolve(directory);
        if !self.server.lock().directories.contains(&path) {
            return Err(not_found(directory));
        }
        self.cwd = path;
        Ok(())
    }

    fn mkdir(&mut self, directory: &str) -> TransportResult<String> {
        self.ready()?;
        let path = self.resolve(directory);
        let mut state = self.server.lock();
        if state.directories.contains(&path) || state.files.contains_key(&path) {
            return Err(TransportError::reply(550, format!("{directory}: File exists")));
        }
        if !state.directories.contains(&parent_of(&path)) {
            return Err(not_found(directory));
        }
        state.directories.insert(path.clone());
        Ok(path)
    }

    fn rmdir(&mut self, directory: &str) -> TransportResult<()> {
        self.ready()?;
        let path = self.resolve(directory);
        let mut state = self.server.lock();
        if path == "/" || !state.directories.contains(&path) {
            return Err(not_found(directory));
        }
        if !state.is_empty_directory(&path) {
            return Err(TransportError::reply(
                550,
                format!("{directory}: Directory not empty"),
            ));
        }
        state.directories.remove(&path);
        Ok(())
    }

    fn nlist(&mut self, directory: &str) -> TransportResult<Vec<String>> {
        self.ready()?;
        let path = self.resolve(directory);
        let state = self.server.lock();
        if !state.directories.contains(&path) {
            return Err(not_found(directory));
        }
        Ok(state.children(&path).into_iter().map(|(name, _)| name).collect())
    }

    fn rawlist(&mut self, directory: &str, recursive: bool) -> TransportResult<Vec<String>> {
        self.ready()?;
        let root = self.resolve(directory);
        if !self.server.lock().directories.contains(&root) {
            return Err(not_found(directory));
        }

        let mut lines = Vec::new();
        let mut queue = vec![(root.clone(), String::new())];
        while let Some((dir, display)) = queue.pop() {
            let children = self.server.lock().children(&dir);
            for (name, is_dir) in children {
                let path = format!("{}{}", child_prefix(&dir), name);
                let shown = format!("{display}{name}");
                lines.push(self.listing_line(&shown, &path, is_dir));
                if recursive && is_dir {
                    queue.push((path, format!("{shown}/")));
                }
            }
        }
        Ok(lines)
    }

    fn pwd(&mut self) -> TransportResult<String> {
        self.ready()?;
        Ok(self.cwd.clone())
    }

    fn raw(&mut self, command: &str) -> TransportResult<Vec<String>> {
        let verb = command
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        let line = match verb.as_str() {
            "NOOP" => "200 NOOP ok.".to_string(),
            "PWD" if self.logged_in => format!("257 \"{}\" is the current directory", self.cwd),
            _ => format!("502 {verb} not implemented."),
        };
        Ok(vec![line])
    }

    fn exec(&mut self, command: &str) -> TransportResult<()> {
        self.ready()?;
        Err(TransportError::reply(
            502,
            format!("SITE EXEC {command}: not permitted"),
        ))
    }

    fn alloc(&mut self, size: u64) -> TransportResult<String> {
        self.ready()?;
        Ok(format!("202 No storage allocation necessary for {size} bytes."))
    }

    fn chmod(&mut self, mode: u32, file: &str) -> TransportResult<u32> {
        self.ready()?;
        let path = self.resolve(file);
        let mut state = self.server.lock();
        let entry = state.files.get_mut(&path).ok_or_else(|| not_found(file))?;
        entry.mode = mode & 0o777;
        Ok(mode)
    }

    fn rename(&mut self, from: &str, to: &str) -> TransportResult<()> {
        self.ready()?;
        let from_path = self.resolve(from);
        let to_path = self.resolve(to);
        let mut state = self.server.lock();
        if !state.directories.contains(&parent_of(&to_path)) {
            return Err(not_found(to));
        }
        let file = state.files.remove(&from_path).ok_or_else(|| not_found(from))?;
        state.files.insert(to_path, file);
        Ok(())
    }

    fn delete(&mut self, path: &str) -> TransportResult<()> {
        self.ready()?;
        let resolved = self.resolve(path);
        self.server
            .lock()
            .files
            .remove(&resolved)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn mdtm(&mut self, file: &str) -> TransportResult<i64> {
        self.ready()?;
        let path = self.resolve(file);
        let state = self.server.lock();
        state
            .files
            .get(&path)
            .map(|f| f.modified)
            .ok_or_else(|| not_found(file))
    }

    fn size(&mut self, file: &str) -> TransportResult<u64> {
        self.ready()?;
        let path = self.resolve(file);
        let state = self.server.lock();
        state
            .files
            .get(&path)
            .map(|f| f.content.len() as u64)
            .ok_or_else(|| not_found(file))
    }

    fn systype(&mut self) -> TransportResult<String> {
        self.ready()?;
        Ok("UNIX".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (MemoryServer, MemorySession) {
        let server = MemoryServer::new().with_account("user", "pass");
        let connector = MemoryConnector::new(server.clone());
        let mut session = connector
            .connect("localhost", 21, Duration::from_secs(5))
            .unwrap();
        session.login("user", "pass").unwrap();
        (server, session)
    }

    #[test]
    fn test_resolve_paths() {
        let (_server, mut session) = session();
        session.mkdir("/a").unwrap();
        session.chdir("/a").unwrap();
        assert_eq!(session.resolve("b/../c"), "/a/c");
        assert_eq!(session.resolve("/x/./y"), "/x/y");
        assert_eq!(session.resolve(".."), "/");
    }

    #[test]
    fn test_commands_require_login() {
        let server = MemoryServer::new().with_account("user", "pass");
        let mut session = MemoryConnector::new(server)
            .connect("localhost", 21, Duration::from_secs(5))
            .unwrap();
        assert_eq!(session.pwd().unwrap_err().code(), Some(530));
    }

    #[test]
    fn test_directory_listing() {
        let (server, mut session) = session();
        session.mkdir("docs").unwrap();
        server.insert_file("/docs/readme.txt", b"hi");
        server.insert_file("/top.bin", b"x");

        assert_eq!(session.nlist("/").unwrap(), vec!["docs", "top.bin"]);

        let flat = session.rawlist("/", false).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].starts_with('d') && flat[0].ends_with("docs"));

        let deep = session.rawlist("/", true).unwrap();
        assert!(deep.iter().any(|l| l.ends_with("docs/readme.txt")));
    }

    #[test]
    fn test_rmdir_requires_empty_directory() {
        let (server, mut session) = session();
        session.mkdir("/full").unwrap();
        server.insert_file("/full/f", b"1");
        assert!(session.rmdir("/full").is_err());
        session.delete("/full/f").unwrap();
        session.rmdir("/full").unwrap();
        assert!(!server.has_directory("/full"));
    }

    #[test]
    fn test_chmod_shows_in_listing() {
        let (server, mut session) = session();
        server.insert_file("/script.sh", b"#!/bin/sh");
        assert_eq!(session.chmod(0o755, "/script.sh").unwrap(), 0o755);
        let lines = session.rawlist("/", false).unwrap();
        assert!(lines[0].starts_with("-rwxr-xr-x"));
    }

    #[test]
    fn test_drop_releases_session() {
        let (server, session) = session();
        assert_eq!(server.open_sessions(), 1);
        drop(session);
        assert_eq!(server.open_sessions(), 0);
        assert_eq!(server.quits(), 0);
    }

    #[test]
    fn test_quit_is_counted_only_when_acknowledged() {
        let (server, mut session) = session();
        server.set_fail_quit(true);
        assert!(session.quit().is_err());
        assert_eq!(server.quits(), 0);

        server.set_fail_quit(false);
        session.quit().unwrap();
        assert_eq!(server.quits(), 1);
    }
}
