//! Connection core
//!
//! `Connection` holds the configuration and, while connected, the transport
//! session. Opening connects, logs in and optionally enters passive mode;
//! closing quits the session. A connected `Connection` closes itself when
//! dropped.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::ConnectionConfig;
use crate::connection::ConnectionState;
use crate::error::ConnectionError;
use crate::transport::{Connector, FtpSession, SuppaFtpConnector};

/// One logical FTP session over a `Connector`.
pub struct Connection<C: Connector> {
    config: ConnectionConfig,
    connector: C,
    state: ConnectionState,
    session: Option<C::Session>,
}

/// Connection over the `suppaftp` transport.
pub type FtpConnection = Connection<SuppaFtpConnector>;

/// Connection shared with command clients; the mutex serializes commands.
pub type SharedConnection<C = SuppaFtpConnector> = Arc<Mutex<Connection<C>>>;

impl FtpConnection {
    pub fn new(config: ConnectionConfig) -> Result<Self, ConnectionError> {
        Self::with_connector(config, SuppaFtpConnector)
    }
}

impl<C: Connector> Connection<C> {
    /// Builds a connection without connecting.
    ///
    /// Fails with `Configuration` when the connector's capability is not
    /// available or the configuration does not validate.
    pub fn with_connector(config: ConnectionConfig, connector: C) -> Result<Self, ConnectionError> {
        if !connector.is_available() {
            return Err(ConnectionError::Configuration(
                "FTP capability is not available in this environment".into(),
            ));
        }

        config
            .validate()
            .map_err(|e| ConnectionError::Configuration(e.to_string()))?;

        debug!("Connection configured for {}", config.address());

        Ok(Self {
            config,
            connector,
            state: ConnectionState::NeverConnected,
            session: None,
        })
    }

    pub fn into_shared(self) -> SharedConnection<C> {
        Arc::new(Mutex::new(self))
    }

    /// Connects and logs in.
    ///
    /// Any handle obtained before a failing step is released before the
    /// error is returned. Opening an open connection fails and leaves it
    /// untouched.
    pub fn open(&mut self) -> Result<bool, ConnectionError> {
        if self.state.is_connected() {
            return Err(ConnectionError::AlreadyConnected);
        }

        info!("Opening connection to {}", self.config.address());

        let mut session = self
            .connector
            .connect(&self.config.host, self.config.port, self.config.timeout())
            .map_err(|source| ConnectionError::Connect {
                host: self.config.host.clone(),
                port: self.config.port,
                source,
            })?;

        session
            .login(&self.config.username, &self.config.password)
            .map_err(|source| ConnectionError::BadCredentials {
                username: self.config.username.clone(),
                source,
            })?;

        if self.config.passive {
            session
                .set_passive(true)
                .map_err(|source| ConnectionError::PassiveMode { source })?;
        }

        self.session = Some(session);
        self.state = ConnectionState::Connected;

        info!(
            "Logged in to {} as {}{}",
            self.config.address(),
            self.config.username,
            if self.config.passive { " (passive)" } else { "" }
        );

        Ok(true)
    }

    /// Quits the session.
    ///
    /// Returns whether the server acknowledged the quit. The connection only
    /// becomes `Disconnected` when it did; closing a connection that is not
    /// open returns `false` and changes nothing.
    pub fn close(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("Close requested on {} while not connected", self.config.address());
            return false;
        };

        match session.quit() {
            Ok(()) => {
                self.session = None;
                self.state = ConnectionState::Disconnected;
                info!("Connection to {} closed", self.config.address());
                true
            }
            Err(e) => {
                warn!("Failed to close connection to {}: {}", self.config.address(), e);
                false
            }
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Transport handle for the command layer; `None` unless connected.
    pub fn handle_mut(&mut self) -> Option<&mut C::Session> {
        self.session.as_mut()
    }

    pub fn handle(&self) -> Option<&C::Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    pub fn is_passive(&self) -> bool {
        self.config.passive
    }
}

impl<C: Connector> Drop for Connection<C> {
    fn drop(&mut self) {
        if self.state.is_connected() {
            self.close();
        }
    }
}
