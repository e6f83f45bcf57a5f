//! Main application state and service coordination
//!
//! This module contains the production `AppState` that owns the waiting pool,
//! binds the listener, and runs the accept loop and matchmaker as background
//! tasks.

use crate::config::AppConfig;
use crate::lobby::{Matchmaker, MatchmakerStats, WaitingPool};
use crate::net::{PlayerConnection, StreamLineTransport};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock as StdRwLock};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transport setup failed: {message}")]
    TransportSetup { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Statistics about the accept side of the service
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    /// Total connections accepted
    pub players_accepted: u64,
    /// Connections dropped during the handshake
    pub handshakes_failed: u64,
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The shared waiting pool
    pool: Arc<WaitingPool>,

    /// The pairing worker
    matchmaker: Arc<Matchmaker>,

    /// Accept-side statistics
    stats: Arc<StdRwLock<CoordinatorStats>>,

    /// Address actually bound, available after `start`
    local_addr: StdRwLock<Option<SocketAddr>>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application components
    pub fn new(config: AppConfig) -> Self {
        let pool = Arc::new(WaitingPool::new());
        let matchmaker = Arc::new(Matchmaker::new(Arc::clone(&pool), config.game.clone()));

        Self {
            config,
            pool,
            matchmaker,
            stats: Arc::new(StdRwLock::new(CoordinatorStats::default())),
            local_addr: StdRwLock::new(None),
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Bind the listener and start the matchmaker and accept loop.
    /// A bind failure is fatal to startup.
    pub async fn start(&self) -> Result<(), ServiceError> {
        let bind_addr = format!("{}:{}", self.config.network.host, self.config.network.port);
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            ServiceError::TransportSetup {
                message: format!("cannot bind {}: {}", bind_addr, e),
            }
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServiceError::TransportSetup {
                message: format!("cannot read bound address: {}", e),
            })?;

        if let Ok(mut slot) = self.local_addr.write() {
            *slot = Some(local_addr);
        }
        *self.is_running.write().await = true;
        info!("Coordinator listening on {}", local_addr);

        let mut tasks = self.background_tasks.lock().await;

        let matchmaker = Arc::clone(&self.matchmaker);
        tasks.push(tokio::spawn(async move { matchmaker.run().await }));

        let pool = Arc::clone(&self.pool);
        let stats = Arc::clone(&self.stats);
        tasks.push(tokio::spawn(Self::accept_loop(listener, pool, stats)));

        Ok(())
    }

    /// Accept connections forever, spawning a handshake task per participant
    async fn accept_loop(
        listener: TcpListener,
        pool: Arc<WaitingPool>,
        stats: Arc<StdRwLock<CoordinatorStats>>,
    ) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
                    }
                    if let Ok(mut stats) = stats.write() {
                        stats.players_accepted += 1;
                    }

                    let pool = Arc::clone(&pool);
                    let stats = Arc::clone(&stats);
                    tokio::spawn(async move {
                        let transport = StreamLineTransport::new(stream);
                        let mut conn = PlayerConnection::new(Box::new(transport));
                        match conn.handshake().await {
                            Ok(()) => pool.enqueue(conn).await,
                            Err(e) => {
                                debug!("Handshake with {} failed: {}", peer, e);
                                if let Ok(mut stats) = stats.write() {
                                    stats.handshakes_failed += 1;
                                }
                                conn.close().await;
                            }
                        }
                    });
                }
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    // Back off briefly so a persistent accept error cannot spin
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Address the listener is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.read().ok().and_then(|slot| *slot)
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Number of participants currently waiting for a match
    pub async fn waiting_count(&self) -> usize {
        self.pool.len().await
    }

    /// Snapshot of accept-side statistics
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    /// Snapshot of matchmaker statistics
    pub fn matchmaker_stats(&self) -> MatchmakerStats {
        self.matchmaker.stats()
    }

    /// Stop background tasks; running sessions are abandoned with the process
    pub async fn shutdown(&self) {
        info!("Stopping coordinator components...");
        *self.is_running.write().await = false;

        let mut tasks = self.background_tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("Coordinator components stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{wait_for_line, wait_until};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.network.host = "127.0.0.1".to_string();
        config.network.port = 0; // ephemeral
        config
    }

    #[tokio::test]
    async fn test_start_binds_and_reports_address() {
        let app = AppState::new(test_config());
        assert!(app.local_addr().is_none());

        app.start().await.unwrap();
        assert!(app.local_addr().is_some());
        assert!(app.is_running().await);

        app.shutdown().await;
        assert!(!app.is_running().await);
    }

    #[tokio::test]
    async fn test_accepted_connection_is_enqueued_after_handshake() {
        let app = Arc::new(AppState::new(test_config()));
        app.start().await.unwrap();
        let addr = app.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"Zoe\n").await.unwrap();

        // The courtesy notice proves the handshake completed and the
        // participant reached the pool (the matchmaker may draw them at once,
        // so the pool length itself is transient)
        let (read_half, _write_half) = client.into_split();
        let mut lines = BufReader::new(read_half).lines();
        wait_for_line(&mut lines, "Hello, Zoe!").await;
        wait_for_line(&mut lines, "You are in the lobby").await;

        wait_until("the accept stats settle", || {
            let app = Arc::clone(&app);
            async move { app.stats().players_accepted == 1 }
        })
        .await;

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_fatal() {
        let first = AppState::new(test_config());
        first.start().await.unwrap();
        let addr = first.local_addr().unwrap();

        // Second bind to the same port must fail with a transport-setup error
        let mut config = test_config();
        config.network.port = addr.port();
        let second = AppState::new(config);
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, ServiceError::TransportSetup { .. }));

        first.shutdown().await;
    }
}
