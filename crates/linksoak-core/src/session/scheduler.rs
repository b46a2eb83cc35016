//! Hand-off scheduling between the two transfer directions
//!
//! Enforces at-most-one active transmitter over the shared medium: a
//! single turn token alternates between the directions, and a worker may
//! only run a cycle while the session is running and it holds the token.

use std::sync::{Condvar, Mutex};

/// One of the two transfer directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Send on port A, validate the echo on port B
    AtoB,
    /// Send on port B, validate the echo on port A
    BtoA,
}

impl Direction {
    /// The opposite direction
    pub fn peer(self) -> Self {
        match self {
            Direction::AtoB => Direction::BtoA,
            Direction::BtoA => Direction::AtoB,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::AtoB => write!(f, "A->B"),
            Direction::BtoA => write!(f, "B->A"),
        }
    }
}

struct Gate {
    turn: Direction,
    running: bool,
    exiting: bool,
}

/// Shared gate deciding whose turn it is and whether traffic may flow
pub struct HandoffScheduler {
    gate: Mutex<Gate>,
    cond: Condvar,
}

impl HandoffScheduler {
    /// Create a scheduler with `first` holding the starting token.
    /// The session starts paused; nothing runs until [`set_running`].
    ///
    /// [`set_running`]: HandoffScheduler::set_running
    pub fn new(first: Direction) -> Self {
        Self {
            gate: Mutex::new(Gate {
                turn: first,
                running: false,
                exiting: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Block until the session is running and `dir` holds the token.
    /// Returns `false` when the session is shutting down instead.
    pub fn wait_turn(&self, dir: Direction) -> bool {
        let mut gate = self.gate.lock().unwrap();
        while !gate.exiting && !(gate.running && gate.turn == dir) {
            gate = self.cond.wait(gate).unwrap();
        }
        !gate.exiting
    }

    /// Release the token held by `dir` and hand it to the peer
    pub fn pass_turn(&self, dir: Direction) {
        let mut gate = self.gate.lock().unwrap();
        if gate.turn == dir {
            gate.turn = dir.peer();
        }
        self.cond.notify_all();
    }

    /// Gate or un-gate steady-state traffic (start / pause)
    pub fn set_running(&self, running: bool) {
        let mut gate = self.gate.lock().unwrap();
        gate.running = running;
        self.cond.notify_all();
    }

    /// Wake all waiters with the exit signal raised
    pub fn shutdown(&self) {
        let mut gate = self.gate.lock().unwrap();
        gate.exiting = true;
        gate.running = false;
        self.cond.notify_all();
    }

    /// True once [`shutdown`](HandoffScheduler::shutdown) has been called
    pub fn is_exiting(&self) -> bool {
        self.gate.lock().unwrap().exiting
    }
}
