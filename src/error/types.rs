//! Error types
//!
//! One error vocabulary per layer: `ConnectionError` for the session
//! lifecycle, `CommandError` for everything that fails after the session is
//! up, and `TransportError` for the raw capability underneath both.

use std::io;

use thiserror::Error;

use crate::transport::FtpOption;

/// Failures reported by the underlying FTP capability.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("server replied {code}: {message}")]
    Reply { code: u32, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("no non-blocking transfer in progress")]
    NoPendingTransfer,

    #[error("a non-blocking transfer is still in progress")]
    TransferInProgress,

    #[error("invalid value for option {0:?}")]
    InvalidOptionValue(FtpOption),
}

impl TransportError {
    /// Builds a reply error from a status code and the server's text.
    pub fn reply(code: u32, message: impl Into<String>) -> Self {
        TransportError::Reply {
            code,
            message: message.into(),
        }
    }

    /// FTP reply code carried by this error, if the server produced one.
    pub fn code(&self) -> Option<u32> {
        match self {
            TransportError::Reply { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<suppaftp::types::FtpError> for TransportError {
    fn from(error: suppaftp::types::FtpError) -> Self {
        use suppaftp::types::FtpError;

        match error {
            FtpError::ConnectionError(e) => TransportError::Io(e),
            FtpError::UnexpectedResponse(response) => TransportError::Reply {
                code: response.status.code(),
                message: reply_message(&String::from_utf8_lossy(&response.body)),
            },
            other => TransportError::Protocol(other.to_string()),
        }
    }
}

/// Reply text without the leading status code.
fn reply_message(body: &str) -> String {
    let body = body.trim_end();
    match body.get(..3) {
        Some(code) if code.bytes().all(|b| b.is_ascii_digit()) => body[3..]
            .trim_start_matches(['-', ' '])
            .to_string(),
        _ => body.to_string(),
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Connection lifecycle errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "connection is already established, a connection can not be opened twice without closing it"
    )]
    AlreadyConnected,

    #[error("can't connect to the server {host} on port {port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    // The password never appears here.
    #[error("login rejected for username {username}")]
    BadCredentials {
        username: String,
        #[source]
        source: TransportError,
    },

    #[error("passive mode can not be turned on")]
    PassiveMode {
        #[source]
        source: TransportError,
    },

    #[error("connection is not established")]
    NotConnected,
}

impl ConnectionError {
    /// Only transport-level connect failures are worth retrying, and only by
    /// the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectionError::Connect { .. })
    }
}

/// Uniform failure of a post-connection operation.
#[derive(Debug, Error)]
#[error("command `{operation}` failed: {source}")]
pub struct CommandError {
    operation: &'static str,
    #[source]
    source: TransportError,
}

impl CommandError {
    pub fn new(operation: &'static str, source: TransportError) -> Self {
        Self { operation, source }
    }

    /// Name of the client operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The original capability error.
    pub fn cause(&self) -> &TransportError {
        &self.source
    }

    /// FTP reply code of the original error, if any.
    pub fn code(&self) -> Option<u32> {
        self.source.code()
    }
}

/// Error returned by every command client operation.
///
/// Connection errors raised by the implicit open are passed through as-is
/// rather than being folded into `CommandError`.
#[derive(Debug, Error)]
pub enum FtpClientError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl FtpClientError {
    pub fn as_connection(&self) -> Option<&ConnectionError> {
        match self {
            FtpClientError::Connection(e) => Some(e),
            FtpClientError::Command(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            FtpClientError::Command(e) => Some(e),
            FtpClientError::Connection(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_command_error_keeps_cause() {
        let err = CommandError::new("delete", TransportError::reply(550, "No such file"));
        assert_eq!(err.operation(), "delete");
        assert_eq!(err.code(), Some(550));
        assert!(err.to_string().contains("delete"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_bad_credentials_message_names_user_only() {
        let err = ConnectionError::BadCredentials {
            username: "alice".into(),
            source: TransportError::reply(530, "Login incorrect"),
        };
        assert_eq!(err.to_string(), "login rejected for username alice");
    }

    #[test]
    fn test_only_connect_is_retryable() {
        let connect = ConnectionError::Connect {
            host: "h".into(),
            port: 21,
            source: TransportError::Protocol("refused".into()),
        };
        assert!(connect.is_retryable());
        assert!(!ConnectionError::AlreadyConnected.is_retryable());
        assert!(!ConnectionError::Configuration("x".into()).is_retryable());
    }

    #[test]
    fn test_reply_message_drops_status_code() {
        use suppaftp::Status;
        use suppaftp::types::{FtpError, Response};

        let err = TransportError::from(FtpError::UnexpectedResponse(Response::new(
            Status::ClosingDataConnection,
            b"226 Transfer complete\r\n".to_vec(),
        )));
        assert_eq!(err.code(), Some(226));
        assert_eq!(err.to_string(), "server replied 226: Transfer complete");

        assert_eq!(reply_message("550-No such file"), "No such file");
        assert_eq!(reply_message("no code here"), "no code here");
    }

    #[test]
    fn test_client_error_accessors() {
        let err: FtpClientError = ConnectionError::AlreadyConnected.into();
        assert!(err.as_connection().is_some());
        assert!(err.as_command().is_none());
    }
}
