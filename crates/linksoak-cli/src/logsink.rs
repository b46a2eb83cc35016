//! Log sink setup
//!
//! Installs a tracing subscriber that writes timestamped lines to the
//! console and mirrors them to a session log file. The file opens with
//! a header recording the configured baud rate and payload size.

use std::fs::File;
use std::io::Write;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use linksoak_core::config::SessionConfig;

/// Create the session log file, emit the header, and install the global
/// subscriber. Returns the log file name.
pub fn init(config: &SessionConfig) -> Result<String> {
    let baud = config.initial_baud();
    let now = Local::now();
    let file_name = format!("linksoak-{}-{}.log", baud, now.format("%d-%m-%Y"));

    let mut file =
        File::create(&file_name).with_context(|| format!("creating log file {file_name}"))?;

    let rule = "=".repeat(50);
    let header = format!(
        "{rule}\n\
         Log File: {file_name}\n\
         Baudrate: {baud}\n\
         Start Date: {}\n\
         pkg size: {}\n\
         {rule}\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        config.payload_size,
    );
    file.write_all(header.as_bytes())
        .context("writing log header")?;
    file.flush()?;
    print!("{header}");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout.and(Mutex::new(file)))
        .with_ansi(false)
        .init();

    Ok(file_name)
}
