//! Module `state`
//!
//! Tri-state view of a connection's lifecycle.

/// Lifecycle state of a `Connection`.
///
/// `NeverConnected` and `Disconnected` are kept apart so callers can tell a
/// connection that was never opened from one that was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    NeverConnected,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    /// `None` until the first open or close, then whether the session is up.
    pub fn as_option(self) -> Option<bool> {
        match self {
            ConnectionState::NeverConnected => None,
            ConnectionState::Connected => Some(true),
            ConnectionState::Disconnected => Some(false),
        }
    }
}
