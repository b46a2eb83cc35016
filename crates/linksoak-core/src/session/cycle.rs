//! Link cycle engine
//!
//! One cycle sends a fresh random frame on the sender port and validates
//! the echo read back on the receiver port. Failures (short read,
//! checksum mismatch, transport error) are reported to the error monitor
//! and retried immediately with a regenerated payload; the only bound on
//! retries is the monitor's consecutive-failure threshold.

use std::sync::Mutex;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::protocol::{Frame, Link, LinkError, CHECKSUM_LEN, PAYLOAD_BYTE_MAX};

use super::{ErrorMonitor, HandoffScheduler, Verdict};

/// Result of one run-to-completion cycle, internal retries included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Frame delivered and validated; carries the session-wide success
    /// count since the last rotation
    Success {
        /// Successes accumulated since the last baud rotation
        successes: u32,
    },
    /// The error monitor declared the failure streak fatal
    FatalErrors,
    /// Shutdown was observed between retries
    Interrupted,
}

/// Run one cycle for the direction sending on `sender` and validating on
/// `receiver`. Must be called while holding the hand-off token.
pub fn run_cycle(
    sender: &Mutex<Link>,
    receiver: &Mutex<Link>,
    payload_size: usize,
    monitor: &ErrorMonitor,
    scheduler: &HandoffScheduler,
) -> CycleOutcome {
    loop {
        // Retries are bounded by the monitor, but a quit command must
        // still be able to interrupt a failing streak
        if scheduler.is_exiting() {
            return CycleOutcome::Interrupted;
        }

        match attempt(sender, receiver, payload_size) {
            Ok(checksum) => {
                let successes = monitor.report_success();
                let receiver = receiver.lock().unwrap();
                info!(
                    port = receiver.name(),
                    checksum, successes, "frame delivered and validated"
                );
                return CycleOutcome::Success { successes };
            }
            Err(e) => {
                {
                    let mut receiver = receiver.lock().unwrap();
                    receiver.record_error();
                    warn!(port = receiver.name(), error = %e, "cycle failed, retrying");
                }
                if monitor.report_failure() == Verdict::Fatal {
                    return CycleOutcome::FatalErrors;
                }
            }
        }
    }
}

/// One send/receive/validate attempt
fn attempt(
    sender: &Mutex<Link>,
    receiver: &Mutex<Link>,
    payload_size: usize,
) -> Result<u32, LinkError> {
    let mut rng = rand::thread_rng();
    let payload: Vec<u8> = (0..payload_size)
        .map(|_| rng.gen_range(0..=PAYLOAD_BYTE_MAX))
        .collect();
    let frame = Frame::new(payload);
    let bytes = frame.to_bytes();

    {
        let mut sender = sender.lock().unwrap();
        debug!(port = sender.name(), len = bytes.len(), "sending frame");
        sender.write_all(&bytes)?;
    }

    let mut buf = vec![0u8; payload_size + CHECKSUM_LEN];
    {
        let mut receiver = receiver.lock().unwrap();
        receiver.read_exact(&mut buf)?;
    }

    let received = Frame::from_bytes(&buf, payload_size)?;
    Ok(received.checksum)
}
