//! The matchmaker loop
//!
//! One logical worker that continuously drains the waiting pool pairwise and
//! spawns a session per live pair. Pairing is strict arrival-order FIFO with no
//! priority or skill-based matching.

use crate::config::GameSettings;
use crate::lobby::pool::WaitingPool;
use crate::session::Session;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Statistics about matchmaker operations
#[derive(Debug, Clone, Default)]
pub struct MatchmakerStats {
    /// Total number of sessions spawned
    pub pairs_matched: u64,
    /// Dead connections discarded at pairing time
    pub dead_discarded: u64,
    /// Live participants re-queued because their partner vanished
    pub partners_requeued: u64,
}

/// Pairs waiting participants into sessions
pub struct Matchmaker {
    pool: Arc<WaitingPool>,
    settings: GameSettings,
    stats: Arc<RwLock<MatchmakerStats>>,
}

impl Matchmaker {
    pub fn new(pool: Arc<WaitingPool>, settings: GameSettings) -> Self {
        Self {
            pool,
            settings,
            stats: Arc::new(RwLock::new(MatchmakerStats::default())),
        }
    }

    /// Snapshot of the current statistics
    pub fn stats(&self) -> MatchmakerStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    /// Run the pairing loop forever.
    ///
    /// The second participant of a pair is only drawn once the first has passed
    /// the liveness check, so discarding a dead first draw leaves its would-be
    /// partner at the head of the queue. A dead second draw sends the live
    /// first back to the tail instead.
    pub async fn run(&self) {
        info!("Matchmaker started");
        loop {
            let mut first = self.pool.take().await;
            if !first.is_live() {
                first.close().await;
                self.record(|stats| stats.dead_discarded += 1);
                debug!("Discarded dead connection at pairing");
                continue;
            }

            let mut second = self.pool.take().await;
            if !second.is_live() {
                second.close().await;
                info!(
                    "Partner of '{}' vanished before pairing completed; re-queueing",
                    first.name()
                );
                self.record(|stats| {
                    stats.dead_discarded += 1;
                    stats.partners_requeued += 1;
                });
                self.pool.enqueue(first).await;
                continue;
            }

            info!("Pairing '{}' vs '{}'", first.name(), second.name());
            self.record(|stats| stats.pairs_matched += 1);

            let session = Session::new(
                first,
                second,
                Arc::clone(&self.pool),
                self.settings.clone(),
            );
            // A running match must never block the pairing loop
            tokio::spawn(session.run());
        }
    }

    fn record<F: FnOnce(&mut MatchmakerStats)>(&self, update: F) {
        match self.stats.write() {
            Ok(mut stats) => update(&mut stats),
            Err(_) => warn!("Matchmaker stats lock poisoned"),
        }
    }
}
