//! Session configuration
//!
//! All tunables of the harness live here: port names, the baud-rate
//! rotation list, payload size, timeouts, and the error threshold.
//! Configs load from a JSON file or fall back to the defaults used by
//! the bench setup.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::protocol::{CHECKSUM_LEN, DEFAULT_TIMEOUT_MS};

/// Baud rates cycled through by the rotator, in order
pub const DEFAULT_BAUD_RATES: [u32; 9] = [
    9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600, 2000000,
];

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// First serial port (sync initiator, holds the starting token)
    pub port_a: String,
    /// Second serial port
    pub port_b: String,
    /// Ordered baud-rate rotation list
    pub baud_rates: Vec<u32>,
    /// Index into `baud_rates` to start at
    pub start_baud_index: usize,
    /// Payload bytes per frame (checksum field excluded)
    pub payload_size: usize,
    /// Frame read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Consecutive failures across both links before shutdown
    pub max_consecutive_errors: u32,
    /// Session-wide successes between baud rotations
    pub max_data_count: u32,
    /// Settle delay around port reopen during rotation, in milliseconds
    pub settle_delay_ms: u64,
    /// Pause after a successful cycle, in milliseconds
    pub inter_cycle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port_a: "/dev/ttyUSB0".to_string(),
            port_b: "/dev/ttyUSB1".to_string(),
            baud_rates: DEFAULT_BAUD_RATES.to_vec(),
            start_baud_index: 0,
            payload_size: 3000,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_consecutive_errors: 5,
            max_data_count: 64,
            settle_delay_ms: 300,
            inter_cycle_delay_ms: 100,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.baud_rates.is_empty(), "baud rate list is empty");
        anyhow::ensure!(
            self.start_baud_index < self.baud_rates.len(),
            "start baud index {} out of range (list has {} entries)",
            self.start_baud_index,
            self.baud_rates.len()
        );
        anyhow::ensure!(self.payload_size > 0, "payload size must be non-zero");
        anyhow::ensure!(
            self.max_consecutive_errors > 0,
            "consecutive error threshold must be non-zero"
        );
        anyhow::ensure!(self.max_data_count > 0, "max data count must be non-zero");
        Ok(())
    }

    /// Baud rate the session opens with
    pub fn initial_baud(&self) -> u32 {
        self.baud_rates[self.start_baud_index]
    }

    /// Total on-wire frame size: payload plus checksum field
    pub fn frame_size(&self) -> usize {
        self.payload_size + CHECKSUM_LEN
    }

    /// Frame read timeout as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.initial_baud(), 9600);
        assert_eq!(config.frame_size(), 3004);
        assert_eq!(config.max_consecutive_errors, 5);
        assert_eq!(config.max_data_count, 64);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "payload_size": 16, "baud_rates": [9600, 19200] }}"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.payload_size, 16);
        assert_eq!(config.baud_rates, vec![9600, 19200]);
        assert_eq!(config.port_a, "/dev/ttyUSB0");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            baud_rates: Vec::new(),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            start_baud_index: 9,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
