//! In-memory loopback transport for exercising the engine without
//! physical serial ports. Two transports share a crossed pair of byte
//! queues, so bytes written on one end arrive on the other, exactly
//! like the bench's crossed cable.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use linksoak_core::protocol::{LinkError, Transport};

type Wire = Arc<Mutex<VecDeque<u8>>>;

/// Surface engine logs under `cargo test -- --nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// One end of a crossed in-memory cable
pub struct LoopbackTransport {
    name: String,
    baud: Arc<Mutex<u32>>,
    tx: Wire,
    rx: Wire,
    corrupt_writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

/// Build a crossed pair: bytes written on one end are read on the other
pub fn loopback_pair(
    name_a: &str,
    name_b: &str,
    baud: u32,
) -> (LoopbackTransport, LoopbackTransport) {
    let a_to_b: Wire = Arc::new(Mutex::new(VecDeque::new()));
    let b_to_a: Wire = Arc::new(Mutex::new(VecDeque::new()));

    let a = LoopbackTransport {
        name: name_a.to_string(),
        baud: Arc::new(Mutex::new(baud)),
        tx: Arc::clone(&a_to_b),
        rx: Arc::clone(&b_to_a),
        corrupt_writes: Arc::new(AtomicUsize::new(0)),
        fail_writes: Arc::new(AtomicBool::new(false)),
    };
    let b = LoopbackTransport {
        name: name_b.to_string(),
        baud: Arc::new(Mutex::new(baud)),
        tx: b_to_a,
        rx: a_to_b,
        corrupt_writes: Arc::new(AtomicUsize::new(0)),
        fail_writes: Arc::new(AtomicBool::new(false)),
    };
    (a, b)
}

impl LoopbackTransport {
    /// Flip the last byte of the next `n` writes on this end
    pub fn corrupt_next_writes(&self, n: usize) {
        self.corrupt_writes.store(n, Ordering::SeqCst);
    }

    /// Shared handle to the corruption counter, usable after the
    /// transport has moved into a session
    pub fn corruptor(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.corrupt_writes)
    }

    /// Make every write on this end fail with a serial error
    pub fn set_write_error(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Shared handle observing this end's configured baud rate
    pub fn baud_probe(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.baud)
    }

    /// Push stray bytes onto this end's receive side
    pub fn inject(&self, bytes: &[u8]) {
        self.rx.lock().unwrap().extend(bytes.iter().copied());
    }
}

impl Transport for LoopbackTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn baud(&self) -> u32 {
        *self.baud.lock().unwrap()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), LinkError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LinkError::Serial("injected write failure".to_string()));
        }

        let mut data = data.to_vec();
        if self.corrupt_writes.load(Ordering::SeqCst) > 0 {
            self.corrupt_writes.fetch_sub(1, Ordering::SeqCst);
            if let Some(last) = data.last_mut() {
                *last ^= 0xFF;
            }
        }

        self.tx.lock().unwrap().extend(data);
        Ok(())
    }

    fn read_exact_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), LinkError> {
        let deadline = Instant::now() + timeout;
        let mut offset = 0;

        loop {
            {
                let mut rx = self.rx.lock().unwrap();
                while offset < buf.len() {
                    match rx.pop_front() {
                        Some(byte) => {
                            buf[offset] = byte;
                            offset += 1;
                        }
                        None => break,
                    }
                }
            }

            if offset == buf.len() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(LinkError::Timeout {
                    wanted: buf.len(),
                    got: offset,
                });
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), LinkError> {
        self.rx.lock().unwrap().clear();
        Ok(())
    }

    fn reopen(&mut self, baud: u32) -> Result<(), LinkError> {
        *self.baud.lock().unwrap() = baud;
        Ok(())
    }

    fn close(&mut self) {}
}
