//! Transfer result types
//!
//! Defines the status values returned by non-blocking transfer operations.

/// Outcome of one step of a non-blocking transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// The whole file has been moved and the server confirmed it
    Finished,
    /// More data remains; call `nb_continue` again
    MoreData,
}

impl TransferStatus {
    pub fn is_finished(self) -> bool {
        self == TransferStatus::Finished
    }
}
