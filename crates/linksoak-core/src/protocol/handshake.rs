//! Synchronization handshake
//!
//! One-shot exchange establishing a shared starting point before
//! steady-state traffic begins. The initiating side writes the sync
//! pattern; the responding side echoes the ack pattern. Any timeout,
//! I/O failure, or pattern deviation fails the handshake; the caller may
//! restart the whole session but the handshake itself never retries.

use tracing::{info, warn};

use super::{Link, LinkError};

/// Sync pattern written by the initiating side
pub const SYNC_PATTERN: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Ack pattern written back by the responding side
pub const ACK_PATTERN: [u8; 4] = [0xDD, 0xCC, 0xBB, 0xAA];

/// Handshake progress states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet
    Idle,
    /// Sync pattern written by the initiator
    SyncSent,
    /// Ack pattern written, initiator read pending
    AckAwaited,
    /// Both sides confirmed
    Synced,
    /// Terminal failure
    Failed,
}

/// Run the handshake between the two ports.
///
/// Exactly one side acts as sync-initiator; with both ports owned by this
/// process the exchange runs inline over the crossed connection.
pub fn handshake(initiator: &mut Link, responder: &mut Link) -> Result<HandshakeState, LinkError> {
    info!("synchronizing ports...");
    let mut state = HandshakeState::Idle;
    let mut buf = [0u8; 4];

    loop {
        state = match state {
            HandshakeState::Idle => {
                initiator
                    .write_all(&SYNC_PATTERN)
                    .map_err(|e| fail(initiator.name(), "sync write", &e))?;
                info!(port = initiator.name(), "sync pattern sent");
                HandshakeState::SyncSent
            }
            HandshakeState::SyncSent => {
                responder
                    .read_exact(&mut buf)
                    .map_err(|e| fail(responder.name(), "sync read", &e))?;
                if buf != SYNC_PATTERN {
                    warn!(
                        port = responder.name(),
                        expected = ?SYNC_PATTERN,
                        actual = ?buf,
                        "incorrect sync pattern received"
                    );
                    return Err(LinkError::HandshakeFailed(format!(
                        "bad sync pattern on {}: expected {:02x?}, got {:02x?}",
                        responder.name(),
                        SYNC_PATTERN,
                        buf
                    )));
                }
                info!(port = responder.name(), "sync pattern received, sending ack");
                responder
                    .write_all(&ACK_PATTERN)
                    .map_err(|e| fail(responder.name(), "ack write", &e))?;
                HandshakeState::AckAwaited
            }
            HandshakeState::AckAwaited => {
                initiator
                    .read_exact(&mut buf)
                    .map_err(|e| fail(initiator.name(), "ack read", &e))?;
                if buf != ACK_PATTERN {
                    warn!(
                        port = initiator.name(),
                        expected = ?ACK_PATTERN,
                        actual = ?buf,
                        "incorrect ack pattern received"
                    );
                    return Err(LinkError::HandshakeFailed(format!(
                        "bad ack pattern on {}: expected {:02x?}, got {:02x?}",
                        initiator.name(),
                        ACK_PATTERN,
                        buf
                    )));
                }
                HandshakeState::Synced
            }
            HandshakeState::Synced => {
                info!("synchronization complete");
                return Ok(HandshakeState::Synced);
            }
            HandshakeState::Failed => {
                return Err(LinkError::HandshakeFailed("handshake aborted".to_string()));
            }
        };
    }
}

fn fail(port: &str, step: &str, err: &LinkError) -> LinkError {
    warn!(port, step, error = %err, "handshake step failed");
    LinkError::HandshakeFailed(format!("{step} on {port}: {err}"))
}
