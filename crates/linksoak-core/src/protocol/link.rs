//! A single endpoint of the link pair under test

use std::time::Duration;

use super::{LinkError, Transport};

/// One endpoint of the serial link pair.
///
/// Owns the transport handle and the cumulative error counter for this
/// port. The counter persists for the whole session, including across
/// baud-rate rotations.
pub struct Link {
    transport: Box<dyn Transport>,
    timeout: Duration,
    error_count: u64,
}

impl Link {
    /// Wrap an opened transport with the configured read timeout
    pub fn new(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            error_count: 0,
        }
    }

    /// Port identifier
    pub fn name(&self) -> &str {
        self.transport.name()
    }

    /// Currently configured baud rate
    pub fn baud(&self) -> u32 {
        self.transport.baud()
    }

    /// Cumulative error count for this port
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Record one failure against this port
    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Write the whole buffer to the port
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.transport.write_all(data)
    }

    /// Read exactly `buf.len()` bytes within the link's timeout
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        self.transport.read_exact_timeout(buf, self.timeout)
    }

    /// Flush queued output
    pub fn flush(&mut self) -> Result<(), LinkError> {
        self.transport.flush()
    }

    /// Discard pending input and output
    pub fn clear_buffers(&mut self) -> Result<(), LinkError> {
        self.transport.clear_buffers()
    }

    /// Close and reopen the port at a new baud rate
    pub fn reopen(&mut self, baud: u32) -> Result<(), LinkError> {
        self.transport.reopen(baud)
    }

    /// Close the port
    pub fn close(&mut self) {
        self.transport.close();
    }
}
