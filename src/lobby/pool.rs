//! The waiting pool of unmatched participants
//!
//! A serialized FIFO shared between the accept-side enqueuers and the single
//! matchmaker consumer. The internal lock guarantees no connection is ever
//! handed to two callers; liveness filtering is deliberately left to the
//! matchmaker.

use crate::net::PlayerConnection;
use crate::protocol;
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

/// Thread-safe FIFO of participants awaiting a session
#[derive(Default)]
pub struct WaitingPool {
    entries: Mutex<VecDeque<PlayerConnection>>,
    available: Notify,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant at the tail and tell them they are waiting.
    /// An already-dead connection is rejected (no-op).
    pub async fn enqueue(&self, mut conn: PlayerConnection) {
        if !conn.is_live() {
            debug!("Ignoring dead connection '{}' at enqueue", conn.name());
            return;
        }

        conn.send(protocol::POOL_NOTICE).await;

        let mut entries = self.entries.lock().await;
        debug!(
            "'{}' entered the waiting pool ({} now waiting)",
            conn.name(),
            entries.len() + 1
        );
        entries.push_back(conn);
        drop(entries);

        self.available.notify_one();
    }

    /// Block until a participant can be dequeued, strictly in enqueue order.
    /// This is the sole blocking primitive of the matchmaking path; pairs are
    /// drawn as two sequential takes.
    pub async fn take(&self) -> PlayerConnection {
        loop {
            if let Some(conn) = self.entries.lock().await.pop_front() {
                return conn;
            }
            self.available.notified().await;
        }
    }

    /// Number of participants currently waiting
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
