//! Baud-rate rotation
//!
//! After a configured number of session-wide successful cycles both
//! links move to the next rate in the list. Rotation touches both port
//! handles at once and therefore runs only inside a worker's exclusive
//! turn.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::protocol::{Link, LinkError};

/// Advances both links through the configured baud-rate list
pub struct BaudRotator {
    rates: Vec<u32>,
    index: Mutex<usize>,
    max_data_count: u32,
    settle_delay: Duration,
}

impl BaudRotator {
    /// Create a rotator starting at `start_index` into `rates`
    pub fn new(
        rates: Vec<u32>,
        start_index: usize,
        max_data_count: u32,
        settle_delay: Duration,
    ) -> Self {
        let start_index = start_index % rates.len().max(1);
        Self {
            rates,
            index: Mutex::new(start_index),
            max_data_count,
            settle_delay,
        }
    }

    /// Baud rate currently in effect
    pub fn current_rate(&self) -> u32 {
        self.rates[*self.index.lock().unwrap()]
    }

    /// True when enough successes have accumulated to trigger a rotation
    pub fn due(&self, successes: u32) -> bool {
        successes >= self.max_data_count
    }

    /// Flush both links, advance to the next rate, and reopen both ports.
    ///
    /// Must run while the caller holds the hand-off token; the settle
    /// delays give the adapters time to re-enumerate.
    pub fn rotate(&self, link_a: &Mutex<Link>, link_b: &Mutex<Link>) -> Result<u32, LinkError> {
        let new_rate = {
            let mut index = self.index.lock().unwrap();
            *index = (*index + 1) % self.rates.len();
            self.rates[*index]
        };

        let mut a = link_a.lock().unwrap();
        let mut b = link_b.lock().unwrap();

        a.flush()?;
        b.flush()?;
        a.close();
        b.close();
        thread::sleep(self.settle_delay);

        a.reopen(new_rate)?;
        b.reopen(new_rate)?;
        thread::sleep(self.settle_delay);

        info!(baud = new_rate, "baud rate changed automatically");
        Ok(new_rate)
    }
}
