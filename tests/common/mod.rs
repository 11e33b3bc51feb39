#![allow(dead_code)]

use rax_ftp_client::utils::setup_test_logging;
use rax_ftp_client::{Client, Connection, ConnectionConfig, MemoryConnector, MemoryServer};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "pass";
pub const TIMEOUT: u64 = 90;

pub fn server() -> MemoryServer {
    setup_test_logging();
    MemoryServer::new().with_account(USERNAME, PASSWORD)
}

pub fn config(passive: bool) -> ConnectionConfig {
    ConnectionConfig::new("ftp.test", USERNAME, PASSWORD)
        .with_timeout(TIMEOUT)
        .with_passive(passive)
}

pub fn connection(server: &MemoryServer, config: ConnectionConfig) -> Connection<MemoryConnector> {
    Connection::with_connector(config, MemoryConnector::new(server.clone()))
        .expect("memory connector is always available")
}

pub fn client(server: &MemoryServer) -> Client<MemoryConnector> {
    Client::from_connection(connection(server, config(true)))
}

/// Deterministic binary payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}
