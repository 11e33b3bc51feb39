mod common;

use rax_ftp_client::{
    Connection, ConnectionConfig, ConnectionError, ConnectionState, FtpSession, MemoryConnector,
    MemoryServer,
};

use rax_ftp_client::transfer::DataConnectionMode;

use common::{config, connection, server};

#[test]
fn test_missing_capability_fails_construction() {
    let result = Connection::with_connector(
        config(false),
        MemoryConnector::unavailable(MemoryServer::new()),
    );
    assert!(matches!(result, Err(ConnectionError::Configuration(_))));
}

#[test]
fn test_construction_never_connects() {
    let server = server();
    let conn = connection(&server, config(false));

    assert_eq!(conn.state(), ConnectionState::NeverConnected);
    assert_eq!(conn.state().as_option(), None);
    assert_eq!(server.total_connects(), 0);
    assert_eq!(conn.port(), 21);
    assert_eq!(conn.timeout().as_secs(), 90);
}

#[test]
fn test_open_establishes_connection() {
    let server = server();
    let mut conn = connection(&server, config(false));

    assert!(conn.open().unwrap());
    assert!(conn.is_connected());
    assert_eq!(conn.state().as_option(), Some(true));
    assert!(!conn.handle().unwrap().is_passive());
}

#[test]
fn test_open_twice_fails_and_keeps_first_session() {
    let server = server();
    let mut conn = connection(&server, config(false));
    conn.open().unwrap();

    let err = conn.open().unwrap_err();
    assert!(matches!(err, ConnectionError::AlreadyConnected));

    assert!(conn.is_connected());
    assert_eq!(server.open_sessions(), 1);
    assert_eq!(conn.handle_mut().unwrap().pwd().unwrap(), "/");
}

#[test]
fn test_unreachable_host_is_connect_error() {
    let server = server().unreachable();
    let mut conn = connection(&server, config(false));

    match conn.open() {
        Err(ConnectionError::Connect { host, port, .. }) => {
            assert_eq!(host, "ftp.test");
            assert_eq!(port, 21);
        }
        other => panic!("expected connect error, got {other:?}"),
    }
    assert_ne!(conn.state(), ConnectionState::Connected);
}

#[test]
fn test_bad_credentials_release_the_handle() {
    let server = server();
    let bad = ConnectionConfig::new("ftp.test", "abc", "123456");
    let mut conn = connection(&server, bad);

    let err = conn.open().unwrap_err();
    match &err {
        ConnectionError::BadCredentials { username, .. } => assert_eq!(username, "abc"),
        other => panic!("expected bad credentials, got {other:?}"),
    }
    assert!(!err.to_string().contains("123456"));
    assert_ne!(conn.state(), ConnectionState::Connected);
    assert_eq!(server.total_connects(), 1);
    assert_eq!(server.open_sessions(), 0);
}

#[test]
fn test_passive_mode_is_negotiated() {
    let server = server();
    let mut conn = connection(&server, config(true));

    assert!(conn.open().unwrap());
    assert!(conn.handle().unwrap().is_passive());
    assert_eq!(conn.handle().unwrap().data_mode(), DataConnectionMode::Passive);
}

#[test]
fn test_passive_mode_refusal_aborts_open() {
    let server = server().without_passive();
    let mut conn = connection(&server, config(true));

    assert!(matches!(
        conn.open(),
        Err(ConnectionError::PassiveMode { .. })
    ));
    assert_ne!(conn.state(), ConnectionState::Connected);
    assert_eq!(server.open_sessions(), 0);
}

#[test]
fn test_close_reports_outcome() {
    let server = server();
    let mut conn = connection(&server, config(false));
    conn.open().unwrap();

    server.set_fail_quit(true);
    assert!(!conn.close());
    assert!(conn.is_connected());

    server.set_fail_quit(false);
    assert!(conn.close());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert_eq!(conn.state().as_option(), Some(false));
}

#[test]
fn test_drop_closes_open_connection() {
    let server = server();
    {
        let mut conn = connection(&server, config(false));
        conn.open().unwrap();
        assert_eq!(server.open_sessions(), 1);
        assert_eq!(server.quits(), 0);
    }
    assert_eq!(server.quits(), 1);
    assert_eq!(server.open_sessions(), 0);
}

#[test]
fn test_drop_after_close_does_not_quit_again() {
    let server = server();
    {
        let mut conn = connection(&server, config(false));
        conn.open().unwrap();
        assert!(conn.close());
    }
    assert_eq!(server.quits(), 1);
}

#[test]
fn test_drop_of_unopened_connection_sends_nothing() {
    let server = server();
    drop(connection(&server, config(false)));
    assert_eq!(server.total_connects(), 0);
    assert_eq!(server.quits(), 0);
}
