//! Protocol errors

use thiserror::Error;

/// Errors that can occur on the serial link
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Read timed out: wanted {wanted} bytes, got {got}")]
    Timeout { wanted: usize, got: usize },

    #[error("Frame length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Checksum mismatch: calculated {expected}, received {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("Port is not open")]
    NotOpen,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
