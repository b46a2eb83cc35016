//! Transport abstraction over the physical serial port
//!
//! The protocol engine only needs exact-length reads with a bounded
//! deadline plus write/flush/reopen, so it talks to this trait instead of
//! `serialport` directly. Tests substitute an in-memory loopback pair.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use serialport::SerialPort;

use super::LinkError;

/// Polling interval while waiting for bytes to arrive
const POLL_INTERVAL_MS: u64 = 2;

/// Byte-stream transport connecting one port of the link pair
pub trait Transport: Send {
    /// Port identifier (e.g. "/dev/ttyUSB0")
    fn name(&self) -> &str;

    /// Currently configured baud rate
    fn baud(&self) -> u32;

    /// Write the whole buffer to the port
    fn write_all(&mut self, data: &[u8]) -> Result<(), LinkError>;

    /// Fill `buf` exactly, failing with [`LinkError::Timeout`] if the
    /// deadline passes first. The error carries how many bytes arrived.
    fn read_exact_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), LinkError>;

    /// Block until queued output has been handed to the driver
    fn flush(&mut self) -> Result<(), LinkError>;

    /// Discard any pending input and output
    fn clear_buffers(&mut self) -> Result<(), LinkError>;

    /// Close and reopen the port at a new baud rate
    fn reopen(&mut self, baud: u32) -> Result<(), LinkError>;

    /// Close the port; subsequent I/O fails with [`LinkError::NotOpen`]
    fn close(&mut self);
}

/// Production transport over a real serial port
pub struct SerialTransport {
    name: String,
    baud: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open a serial port with standard 8N1 configuration
    pub fn open(name: &str, baud: u32) -> Result<Self, LinkError> {
        let port = open_port(name, baud)?;
        Ok(Self {
            name: name.to_string(),
            baud,
            port: Some(port),
        })
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, LinkError> {
        self.port.as_mut().ok_or(LinkError::NotOpen)
    }
}

fn open_port(name: &str, baud: u32) -> Result<Box<dyn SerialPort>, LinkError> {
    // Short port-level timeout; overall deadlines are enforced by polling
    let mut port = serialport::new(name, baud)
        .timeout(Duration::from_millis(100))
        .open()
        .map_err(|e| LinkError::Serial(e.to_string()))?;
    configure_port(port.as_mut())?;
    Ok(port)
}

/// Standard 8N1 configuration, no flow control
fn configure_port(port: &mut dyn SerialPort) -> Result<(), LinkError> {
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(|e| LinkError::Serial(e.to_string()))?;
    port.set_parity(serialport::Parity::None)
        .map_err(|e| LinkError::Serial(e.to_string()))?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(|e| LinkError::Serial(e.to_string()))?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(|e| LinkError::Serial(e.to_string()))?;
    Ok(())
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn baud(&self) -> u32 {
        self.baud
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.port_mut()?
            .write_all(data)
            .map_err(|e| LinkError::Serial(e.to_string()))
    }

    /// Reads using `bytes_to_read()` polling to avoid blocking read()
    /// calls that outlive the deadline.
    fn read_exact_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), LinkError> {
        let port = self.port_mut()?;
        let start = Instant::now();
        let mut offset = 0;

        while offset < buf.len() {
            if start.elapsed() > timeout {
                return Err(LinkError::Timeout {
                    wanted: buf.len(),
                    got: offset,
                });
            }

            let available = port
                .bytes_to_read()
                .map_err(|e| LinkError::Serial(e.to_string()))? as usize;

            if available == 0 {
                std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
                continue;
            }

            let to_read = std::cmp::min(available, buf.len() - offset);
            match port.read(&mut buf[offset..offset + to_read]) {
                Ok(0) => {
                    return Err(LinkError::Timeout {
                        wanted: buf.len(),
                        got: offset,
                    });
                }
                Ok(n) => offset += n,
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    continue;
                }
                Err(e) => return Err(LinkError::Serial(e.to_string())),
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.port_mut()?
            .flush()
            .map_err(|e| LinkError::Serial(e.to_string()))
    }

    fn clear_buffers(&mut self) -> Result<(), LinkError> {
        self.port_mut()?
            .clear(serialport::ClearBuffer::All)
            .map_err(|e| LinkError::Serial(e.to_string()))
    }

    fn reopen(&mut self, baud: u32) -> Result<(), LinkError> {
        // Drop the old handle first; some adapters refuse a second open
        self.port = None;
        self.baud = baud;
        self.port = Some(open_port(&self.name, baud)?);
        Ok(())
    }

    fn close(&mut self) {
        self.port = None;
    }
}
