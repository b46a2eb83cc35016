//! # linksoak Core Library
//!
//! Link-validation engine for soak-testing serial transceivers.
//!
//! This library provides:
//! - Checksum-framed payload encoding/decoding
//! - The one-shot synchronization handshake between two ports
//! - The send/receive/validate cycle engine with bounded retry
//! - Hand-off scheduling guaranteeing at-most-one active transmitter
//! - Consecutive-error accounting and baud-rate rotation
//!
//! ## Example
//!
//! ```rust,ignore
//! use linksoak_core::config::SessionConfig;
//! use linksoak_core::protocol::SerialTransport;
//! use linksoak_core::session::Session;
//!
//! let config = SessionConfig::default();
//! let a = SerialTransport::open(&config.port_a, config.initial_baud())?;
//! let b = SerialTransport::open(&config.port_b, config.initial_baud())?;
//!
//! let session = Session::establish(config, Box::new(a), Box::new(b))?;
//! let handle = session.handle();
//! handle.start();
//! let report = session.run();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod protocol;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::protocol::{Frame, Link, LinkError, SerialTransport, Transport};
    pub use crate::session::{Session, SessionHandle, SessionReport, SessionState};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
