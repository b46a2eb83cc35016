//! Frame encoding/decoding
//!
//! Implements the binary frame format exchanged during the soak test.
//!
//! Frame format:
//! - N bytes: Payload (each byte in [0, 31])
//! - 4 bytes: Checksum (big-endian arithmetic sum of the payload bytes)

use byteorder::{BigEndian, ByteOrder};

use super::LinkError;

/// Width of the trailing checksum field in bytes
pub const CHECKSUM_LEN: usize = 4;

/// A payload + checksum frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame payload
    pub payload: Vec<u8>,
    /// Arithmetic sum of the payload bytes
    pub checksum: u32,
}

impl Frame {
    /// Create a new frame with the given payload
    pub fn new(payload: Vec<u8>) -> Self {
        let checksum = checksum(&payload);
        Self { payload, checksum }
    }

    /// Decode a frame from raw bytes, given the expected payload length
    pub fn from_bytes(data: &[u8], payload_len: usize) -> Result<Self, LinkError> {
        if data.len() != payload_len + CHECKSUM_LEN {
            return Err(LinkError::LengthMismatch {
                expected: payload_len + CHECKSUM_LEN,
                actual: data.len(),
            });
        }

        let payload = data[..payload_len].to_vec();
        let received = BigEndian::read_u32(&data[payload_len..]);
        let calculated = checksum(&payload);

        if calculated != received {
            return Err(LinkError::ChecksumMismatch {
                expected: calculated,
                actual: received,
            });
        }

        Ok(Self {
            payload,
            checksum: received,
        })
    }

    /// Encode the frame to raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_size());
        bytes.extend_from_slice(&self.payload);

        let mut checksum_bytes = [0u8; CHECKSUM_LEN];
        BigEndian::write_u32(&mut checksum_bytes, self.checksum);
        bytes.extend_from_slice(&checksum_bytes);

        bytes
    }

    /// Get the total encoded size
    pub fn encoded_size(&self) -> usize {
        self.payload.len() + CHECKSUM_LEN
    }
}

/// Arithmetic sum of the payload byte values, wrapping on overflow
pub fn checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

/// Recompute the checksum and compare for exact equality
pub fn validate(payload: &[u8], claimed: u32) -> bool {
    checksum(payload) == claimed
}
