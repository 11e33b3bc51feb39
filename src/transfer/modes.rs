//! FTP transfer modes
//!
//! Representation types for file transfers and data connections.

/// Representation type sent with `TYPE` before a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    Ascii,
    #[default]
    Binary,
}

/// Who opens the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataConnectionMode {
    /// The client listens and the server connects (PORT)
    #[default]
    Active,
    /// The server listens and the client connects (PASV)
    Passive,
}

impl DataConnectionMode {
    pub fn from_passive(passive: bool) -> Self {
        if passive {
            DataConnectionMode::Passive
        } else {
            DataConnectionMode::Active
        }
    }

    pub fn is_passive(self) -> bool {
        self == DataConnectionMode::Passive
    }
}
