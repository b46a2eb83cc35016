//! linksoak — serial link soak-test harness
//!
//! Opens the two configured serial ports, runs the synchronization
//! handshake, then continuously exchanges checksum-framed random
//! payloads between them until told to quit or the consecutive-error
//! limit trips. Baud rates rotate automatically as successful cycles
//! accumulate.
//!
//! Commands on stdin: `s` start/resume, `p` pause, `q` quit. Anything
//! else pauses the session.

mod logsink;

use std::io::BufRead;
use std::thread;

use anyhow::{Context, Result};
use tracing::{info, warn};

use linksoak_core::config::SessionConfig;
use linksoak_core::protocol::SerialTransport;
use linksoak_core::session::{Session, SessionHandle};

fn main() -> Result<()> {
    // Single optional argument: path to a JSON config file
    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::from_file(&path)?,
        None => {
            let config = SessionConfig::default();
            config.validate()?;
            config
        }
    };

    let log_file = logsink::init(&config)?;
    info!(
        log_file = %log_file,
        version = linksoak_core::VERSION,
        "linksoak starting"
    );

    let baud = config.initial_baud();
    let a = SerialTransport::open(&config.port_a, baud)
        .with_context(|| format!("opening serial port {}", config.port_a))?;
    let b = SerialTransport::open(&config.port_b, baud)
        .with_context(|| format!("opening serial port {}", config.port_b))?;
    info!(port = %config.port_a, baud, "serial connection established");
    info!(port = %config.port_b, baud, "serial connection established");

    let session = Session::establish(config, Box::new(a), Box::new(b))
        .context("port synchronization failed")?;

    let handle = session.handle();
    spawn_control_reader(handle);
    info!("type 's' to start, 'p' to pause, or 'q' to quit");

    let report = session.run();
    info!(
        port = %report.port_a,
        errors = report.errors_a,
        "total errors identified"
    );
    info!(
        port = %report.port_b,
        errors = report.errors_b,
        "total errors identified"
    );

    Ok(())
}

/// Translate keystroke commands from stdin into session control calls.
/// Runs detached; the process exits once the session reports.
fn spawn_control_reader(handle: SessionHandle) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "s" => handle.start(),
                "p" => handle.pause(),
                "q" => {
                    handle.quit();
                    break;
                }
                other => {
                    warn!(command = other, "unrecognized command, pausing");
                    handle.pause();
                }
            }
        }
    });
}
