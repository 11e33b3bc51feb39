//! Module `client`
//!
//! Defines the `Client` struct and the single dispatch path every named
//! operation goes through.

use log::debug;
use std::sync::{Arc, MutexGuard, PoisonError};

use crate::connection::{Connection, SharedConnection};
use crate::error::{CommandError, ConnectionError, FtpClientError, TransportResult};
use crate::transport::{Connector, SuppaFtpConnector};

/// Command layer over a shared connection.
///
/// The client never closes the connection; it only opens it when a command
/// arrives and it is not connected.
pub struct Client<C: Connector = SuppaFtpConnector> {
    connection: SharedConnection<C>,
}

impl<C: Connector> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
        }
    }
}

impl<C: Connector> Client<C> {
    pub fn new(connection: SharedConnection<C>) -> Self {
        Self { connection }
    }

    /// Wraps a connection the caller does not need to keep a handle on.
    pub fn from_connection(connection: Connection<C>) -> Self {
        Self::new(connection.into_shared())
    }

    pub fn connection(&self) -> &SharedConnection<C> {
        &self.connection
    }

    fn lock(&self) -> MutexGuard<'_, Connection<C>> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `call` against the session, opening the connection first if
    /// needed.
    ///
    /// Errors from the implicit open come back as
    /// `FtpClientError::Connection`; errors from `call` as
    /// `FtpClientError::Command` naming `operation`. The call's value is
    /// returned untouched.
    pub fn invoke<T, F>(&self, operation: &'static str, call: F) -> Result<T, FtpClientError>
    where
        F: FnOnce(&mut C::Session) -> TransportResult<T>,
    {
        let mut connection = self.lock();

        if !connection.is_connected() {
            debug!("Implicit open before `{}`", operation);
            connection.open()?;
        }

        let session = connection
            .handle_mut()
            .ok_or(ConnectionError::NotConnected)?;

        debug!("Dispatching `{}`", operation);
        call(session).map_err(|source| CommandError::new(operation, source).into())
    }
}
