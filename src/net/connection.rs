//! Per-participant connection state
//!
//! A `PlayerConnection` couples one exclusively owned line transport with the
//! participant's display identity and liveness. At any moment a connection has
//! exactly one logical owner: the waiting pool while queued, or a session while
//! in a match. Ownership transfers are moves, so the type system rules out
//! concurrent access to a participant's stream.

use crate::error::{CoordinatorError, Result};
use crate::net::transport::LineTransport;
use crate::protocol;
use crate::utils::generate_fallback_name;
use tracing::{debug, info};

/// One live participant and their transport
pub struct PlayerConnection {
    name: String,
    alive: bool,
    closed: bool,
    transport: Box<dyn LineTransport>,
}

impl PlayerConnection {
    /// Wrap a freshly accepted transport; the identity is settled by `handshake`
    pub fn new(transport: Box<dyn LineTransport>) -> Self {
        Self {
            name: "?".to_string(),
            alive: true,
            closed: false,
            transport,
        }
    }

    /// Display identity assigned at handshake
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current liveness, without blocking
    pub fn is_live(&self) -> bool {
        self.alive && !self.closed
    }

    /// Exchange the welcome banner for a display name.
    ///
    /// An empty or whitespace-only reply falls back to a generated identity so a
    /// silent client does not fail the connection. A stream that ends before any
    /// reply is a handshake failure and the caller should close the connection.
    pub async fn handshake(&mut self) -> Result<()> {
        self.send(protocol::WELCOME_LINE).await;
        self.send(protocol::NAME_PROMPT).await;

        let reply = self.receive().await.ok_or_else(|| {
            CoordinatorError::HandshakeFailed {
                reason: "stream ended before a name was received".to_string(),
            }
        })?;

        let trimmed = reply.trim();
        self.name = if trimmed.is_empty() {
            generate_fallback_name()
        } else {
            trimmed.to_string()
        };

        self.send(&protocol::greeting_line(&self.name)).await;
        debug!("Handshake complete for '{}'", self.name);
        Ok(())
    }

    /// Deliver one line to the remote side. A no-op (not an error) when the
    /// connection is dead; a transport failure marks it dead.
    pub async fn send(&mut self, line: &str) {
        if !self.is_live() {
            return;
        }
        if let Err(e) = self.transport.send_line(line).await {
            debug!("Send to '{}' failed, marking dead: {}", self.name, e);
            self.alive = false;
        }
    }

    /// Block until a full line arrives. `None` signals end-of-stream (or an
    /// already-dead connection); a transport failure marks the connection dead.
    pub async fn receive(&mut self) -> Option<String> {
        if !self.is_live() {
            return None;
        }
        match self.transport.recv_line().await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.alive = false;
                None
            }
            Err(e) => {
                debug!("Receive from '{}' failed, marking dead: {}", self.name, e);
                self.alive = false;
                None
            }
        }
    }

    /// Prompt-and-read: the blocking primitive the session protocol is built on.
    /// End-of-stream surfaces as `ParticipantDisconnected`.
    pub async fn request(&mut self, prompt: &str) -> Result<String> {
        self.send(prompt).await;
        self.receive()
            .await
            .ok_or_else(|| {
                CoordinatorError::ParticipantDisconnected {
                    name: self.name.clone(),
                }
                .into()
            })
    }

    /// Idempotent close: marks dead, releases the transport, logs the identity
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.alive = false;
        if let Err(e) = self.transport.close().await {
            debug!("Transport close for '{}' failed: {}", self.name, e);
        }
        info!("Participant disconnected: {}", self.name);
    }
}
