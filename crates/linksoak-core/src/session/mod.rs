//! Session orchestration
//!
//! Coordinates the two direction workers: hand-off scheduling, shared
//! error accounting, baud-rate rotation, and the session lifecycle.

mod controller;
mod cycle;
mod monitor;
mod rotator;
mod scheduler;

pub use controller::{Session, SessionHandle, SessionReport, SessionState};
pub use cycle::{run_cycle, CycleOutcome};
pub use monitor::{ErrorMonitor, Verdict};
pub use rotator::BaudRotator;
pub use scheduler::{Direction, HandoffScheduler};
