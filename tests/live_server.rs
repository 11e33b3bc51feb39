//! Tests against a real FTP server.
//!
//! Skipped unless FTP_HOST, FTP_USERNAME and FTP_PASSWORD point at a server
//! the tests may write to. FTP_PORT, FTP_TIMEOUT_SECS and FTP_PASSIVE are
//! honored as well.

use rax_ftp_client::utils::setup_test_logging;
use rax_ftp_client::{
    Client, ConnectionConfig, ConnectionError, ConnectionState, FtpConnection, TransferStatus,
    TransferType,
};

fn live_config() -> Option<ConnectionConfig> {
    setup_test_logging();

    if std::env::var("FTP_HOST").is_err() {
        eprintln!("FTP_HOST not set, skipping live server test");
        return None;
    }

    match ConnectionConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Incomplete FTP_* environment ({e}), skipping live server test");
            None
        }
    }
}

#[test]
fn test_live_open_and_close() {
    let Some(config) = live_config() else { return };
    let mut conn = FtpConnection::new(config).unwrap();

    assert!(conn.open().unwrap());
    assert!(matches!(conn.open(), Err(ConnectionError::AlreadyConnected)));
    assert!(conn.close());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[test]
fn test_live_bad_credentials() {
    let Some(config) = live_config() else { return };
    let bad = ConnectionConfig::new(config.host, "abc", "123456")
        .with_port(config.port)
        .with_timeout(config.timeout_secs);
    let mut conn = FtpConnection::new(bad).unwrap();

    assert!(matches!(
        conn.open(),
        Err(ConnectionError::BadCredentials { .. })
    ));
    assert!(!conn.is_connected());
}

#[test]
fn test_live_round_trip() {
    let Some(config) = live_config() else { return };
    let client = Client::from_connection(FtpConnection::new(config).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("file.txt");
    let downloaded = dir.path().join("file_download.txt");
    std::fs::write(&local, b"rax-ftp-client live test\n").unwrap();

    client.put("rax_live_test", &local, TransferType::Binary, 0).unwrap();
    assert!(client.nlist(".").unwrap().iter().any(|n| n.ends_with("rax_live_test")));

    client
        .get(&downloaded, "rax_live_test", TransferType::Binary, 0)
        .unwrap();
    assert_eq!(
        std::fs::read(&downloaded).unwrap(),
        std::fs::read(&local).unwrap()
    );

    client.delete("rax_live_test").unwrap();
}

#[test]
fn test_live_non_blocking_upload() {
    let Some(config) = live_config() else { return };
    let client = Client::from_connection(FtpConnection::new(config).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("file2.txt");
    std::fs::write(&local, b"non blocking").unwrap();

    let mut status = client
        .put_nb("rax_live_test2", &local, TransferType::Binary, 0)
        .unwrap();
    while status == TransferStatus::MoreData {
        status = client.nb_continue().unwrap();
    }
    assert_eq!(client.size("rax_live_test2").unwrap(), 12);

    client.delete("rax_live_test2").unwrap();
}

#[test]
fn test_live_directories() {
    let Some(config) = live_config() else { return };
    let client = Client::from_connection(FtpConnection::new(config).unwrap());

    let created = client.mkdir("rax_live_dir").unwrap();
    assert!(created.ends_with("rax_live_dir"));
    client.rmdir("rax_live_dir").unwrap();
}
