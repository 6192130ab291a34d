use std::io;

use thiserror::Error;

use crate::tftp::core::MalformedPacket;

/// Why a transfer session stopped, or why a reply was discarded
#[derive(Debug, Error)]
pub enum TransferError {
    /// No reply arrived within the retry budget
    #[error("receive timed out after {0} attempts")]
    Timeout(u32),
    /// Well-formed packet with the wrong opcode or block number
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// The server sent an ERROR packet
    #[error("server error {code}: {message}")]
    ServerError { code: u16, message: String },
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error("malformed packet: {0}")]
    Malformed(#[from] MalformedPacket),
    #[error("invalid server address '{0}'")]
    InvalidAddress(String),
    #[error("transfer cancelled")]
    Cancelled,
}

impl TransferError {
    /// Errors that only discard the offending datagram; the session keeps waiting
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransferError::ProtocolViolation(_) | TransferError::Malformed(_)
        )
    }
}
