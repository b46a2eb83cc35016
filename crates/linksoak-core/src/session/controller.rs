//! Session lifecycle and worker orchestration
//!
//! The [`Session`] owns both links and the shared counters, runs the
//! handshake, and drives the two direction workers. Control commands
//! (start / pause / quit) arrive through a cloneable [`SessionHandle`]
//! so the interactive reader stays outside the core.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::config::SessionConfig;
use crate::protocol::{handshake, Link, LinkError, Transport};

use super::{run_cycle, BaudRotator, CycleOutcome, Direction, ErrorMonitor, HandoffScheduler};

/// Grace period for in-flight cycles to observe the cleared running flag
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Delay between flushing and closing a port at shutdown
const CLOSE_DELAY: Duration = Duration::from_millis(100);

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake done, waiting for the start command
    Idle,
    /// Steady-state traffic flowing
    Running,
    /// Traffic gated off by a pause command
    Paused,
    /// Exit signal raised, workers draining
    ShuttingDown,
    /// Ports closed, final report produced
    Closed,
}

/// Final per-port diagnostics reported at shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Name of port A
    pub port_a: String,
    /// Cumulative errors identified on port A
    pub errors_a: u64,
    /// Name of port B
    pub port_b: String,
    /// Cumulative errors identified on port B
    pub errors_b: u64,
}

struct Shared {
    link_a: Mutex<Link>,
    link_b: Mutex<Link>,
    scheduler: HandoffScheduler,
    monitor: ErrorMonitor,
    rotator: BaudRotator,
    state: Mutex<SessionState>,
}

impl Shared {
    fn begin_shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, SessionState::ShuttingDown | SessionState::Closed) {
            return;
        }
        *state = SessionState::ShuttingDown;
        drop(state);
        self.scheduler.shutdown();
    }
}

/// Thread-safe control surface for a running session
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// Start or resume steady-state traffic
    pub fn start(&self) {
        let mut state = self.shared.state.lock().unwrap();
        match *state {
            SessionState::Idle | SessionState::Paused => {
                *state = SessionState::Running;
                drop(state);
                self.shared.scheduler.set_running(true);
                info!("session started");
            }
            _ => {}
        }
    }

    /// Pause traffic; the in-flight cycle finishes first
    pub fn pause(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if *state == SessionState::Running {
            *state = SessionState::Paused;
            drop(state);
            self.shared.scheduler.set_running(false);
            info!("session paused");
        }
    }

    /// Request an orderly shutdown
    pub fn quit(&self) {
        info!("shutting down the session...");
        self.shared.begin_shutdown();
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.shared.state.lock().unwrap()
    }
}

/// Owns both links, the shared counters, and the worker threads
pub struct Session {
    shared: Arc<Shared>,
    config: SessionConfig,
}

impl Session {
    /// Build a session over an opened pair of transports and run the
    /// synchronization handshake. Port A initiates and holds the
    /// starting token; the session comes up paused.
    pub fn establish(
        config: SessionConfig,
        transport_a: Box<dyn Transport>,
        transport_b: Box<dyn Transport>,
    ) -> Result<Self, LinkError> {
        let timeout = config.read_timeout();
        let mut link_a = Link::new(transport_a, timeout);
        let mut link_b = Link::new(transport_b, timeout);

        handshake(&mut link_a, &mut link_b)?;

        let shared = Arc::new(Shared {
            link_a: Mutex::new(link_a),
            link_b: Mutex::new(link_b),
            scheduler: HandoffScheduler::new(Direction::AtoB),
            monitor: ErrorMonitor::new(config.max_consecutive_errors),
            rotator: BaudRotator::new(
                config.baud_rates.clone(),
                config.start_baud_index,
                config.max_data_count,
                Duration::from_millis(config.settle_delay_ms),
            ),
            state: Mutex::new(SessionState::Idle),
        });

        Ok(Self { shared, config })
    }

    /// Get a control handle for this session
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Spawn both direction workers and block until shutdown.
    ///
    /// Returns the cumulative per-port error counts for diagnostics.
    pub fn run(self) -> SessionReport {
        let workers: Vec<_> = [Direction::AtoB, Direction::BtoA]
            .into_iter()
            .map(|dir| {
                let shared = Arc::clone(&self.shared);
                let payload_size = self.config.payload_size;
                let inter_cycle = Duration::from_millis(self.config.inter_cycle_delay_ms);
                thread::spawn(move || worker_loop(shared, dir, payload_size, inter_cycle))
            })
            .collect();

        for worker in workers {
            let _ = worker.join();
        }

        self.finish()
    }

    /// Shutdown sequence: grace period, per-port error report, flush and
    /// close both ports.
    fn finish(self) -> SessionReport {
        self.shared.begin_shutdown();
        thread::sleep(SHUTDOWN_GRACE);

        let report = {
            let mut link_a = self.shared.link_a.lock().unwrap();
            let mut link_b = self.shared.link_b.lock().unwrap();

            let report = SessionReport {
                port_a: link_a.name().to_string(),
                errors_a: link_a.error_count(),
                port_b: link_b.name().to_string(),
                errors_b: link_b.error_count(),
            };

            for link in [&mut *link_a, &mut *link_b] {
                info!(
                    port = link.name(),
                    errors = link.error_count(),
                    "total errors identified"
                );
                if let Err(e) = link.flush() {
                    error!(port = link.name(), error = %e, "flush failed during shutdown");
                }
                thread::sleep(CLOSE_DELAY);
                link.close();
                info!(port = link.name(), "port closed");
            }

            report
        };

        *self.shared.state.lock().unwrap() = SessionState::Closed;
        report
    }
}

/// Worker loop for one direction: wait for the token, run one cycle to
/// completion, trigger rotation when due, hand the token to the peer.
fn worker_loop(shared: Arc<Shared>, dir: Direction, payload_size: usize, inter_cycle: Duration) {
    let (sender, receiver) = match dir {
        Direction::AtoB => (&shared.link_a, &shared.link_b),
        Direction::BtoA => (&shared.link_b, &shared.link_a),
    };

    loop {
        if !shared.scheduler.wait_turn(dir) {
            break;
        }

        match run_cycle(
            sender,
            receiver,
            payload_size,
            &shared.monitor,
            &shared.scheduler,
        ) {
            CycleOutcome::Success { successes } => {
                if shared.rotator.due(successes) {
                    match shared.rotator.rotate(&shared.link_a, &shared.link_b) {
                        Ok(_) => shared.monitor.reset_success_count(),
                        Err(e) => {
                            error!(direction = %dir, error = %e, "baud rotation failed");
                            shared.begin_shutdown();
                            break;
                        }
                    }
                }
                thread::sleep(inter_cycle);
            }
            CycleOutcome::FatalErrors => {
                shared.begin_shutdown();
                break;
            }
            CycleOutcome::Interrupted => break,
        }

        shared.scheduler.pass_turn(dir);
    }
}
