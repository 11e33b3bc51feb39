//! RAX FTP Client - Entry Point
//!
//! Connection check: opens a session with the configured server, prints the
//! system type, working directory and a listing, then closes.
//!
//! Usage: rax-ftp-client [DIR]

use log::{error, info};
use std::path::Path;
use std::process::ExitCode;

use rax_ftp_client::utils::setup_logging;
use rax_ftp_client::{Client, ConnectionConfig, FtpClientError, FtpConnection};

fn main() -> ExitCode {
    setup_logging();

    let directory = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());

    let config = match ConnectionConfig::load(Some(Path::new("config.toml"))) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let connection = match FtpConnection::new(config) {
        Ok(connection) => connection,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = Client::from_connection(connection);
    let outcome = run(&client, &directory);

    let closed = client
        .connection()
        .lock()
        .map(|mut connection| connection.close())
        .unwrap_or(false);
    info!("Session closed: {}", closed);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(client: &Client, directory: &str) -> Result<(), FtpClientError> {
    println!("System type: {}", client.systype()?);
    println!("Working directory: {}", client.pwd()?);

    for line in client.rawlist(directory, false)? {
        println!("{line}");
    }
    Ok(())
}
