//! Link Protocol
//!
//! Implements the wire protocol exchanged between the two ports under test:
//! checksum-framed payloads, the synchronization handshake, and the
//! transport abstraction over the physical serial port.

mod error;
mod frame;
pub mod handshake;
mod link;
pub mod transport;

pub use error::LinkError;
pub use frame::{checksum, validate, Frame, CHECKSUM_LEN};
pub use handshake::{handshake, HandshakeState, ACK_PATTERN, SYNC_PATTERN};
pub use link::Link;
pub use transport::{SerialTransport, Transport};

/// Default timeout for frame reads in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Highest value a generated payload byte may take (inclusive)
pub const PAYLOAD_BYTE_MAX: u8 = 31;
