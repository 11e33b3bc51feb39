//! Connection configuration
//!
//! Everything a `Connection` needs is fixed up front. Values can be built in
//! code or loaded from an optional TOML file with `FTP_*` environment
//! overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Immutable settings of one FTP session.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    pub password: String,

    /// Connect timeout, also the initial control socket timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub passive: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConnectionConfig {
    /// Configuration with the default port, timeout and active mode.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            passive: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    /// Load from `path` (if given and present) with environment overrides.
    ///
    /// Environment: FTP_HOST, FTP_PORT, FTP_USERNAME, FTP_PASSWORD,
    /// FTP_TIMEOUT_SECS, FTP_PASSIVE
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("FTP"))
            .build()?;

        let config: ConnectionConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the environment only.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(None)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.host.trim().is_empty() {
            return Err(config::ConfigError::Message("host cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.username.is_empty() {
            return Err(config::ConfigError::Message(
                "username cannot be empty".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get the timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get host and port as an address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("passive", &self.passive)
            .finish()
    }
}
