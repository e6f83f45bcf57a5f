//! Main entry point for the duel-room coordinator
//!
//! This is the production entry point that loads configuration, initializes
//! logging, starts the coordinator service, and shuts it down gracefully on
//! SIGINT/SIGTERM.

use anyhow::Result;
use clap::Parser;
use duel_room::config::AppConfig;
use duel_room::service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Duel Room match coordinator
#[derive(Parser)]
#[command(
    name = "duel-room",
    version,
    about = "A TCP match coordinator pairing players into best-of-three rock-paper-scissors duels",
    long_about = "Duel Room accepts TCP connections, pairs waiting players in arrival order, \
                 and drives best-of-three rock-paper-scissors matches with rematch \
                 negotiation over a newline-delimited text protocol."
)]
struct Args {
    /// Listening port (overrides configuration)
    #[arg(value_name = "PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Listen address override
    #[arg(long, value_name = "HOST", help = "Override the listen address")]
    host: Option<String>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting the coordinator"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Periodically log a snapshot of coordinator activity
async fn stats_report_task(app_state: Arc<AppState>, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);

    while app_state.is_running().await {
        ticker.tick().await;

        let stats = app_state.stats();
        let matchmaking = app_state.matchmaker_stats();
        info!(
            "Activity: {} waiting, {} accepted, {} pairs matched, {} partners re-queued",
            app_state.waiting_count().await,
            stats.players_accepted,
            matchmaking.pairs_matched,
            matchmaking.partners_requeued
        );
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🎮 Duel Room Match Coordinator");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Listening on: {}:{}",
        config.network.host, config.network.port
    );
    info!(
        "   Match format: first to {} round wins",
        config.game.rounds_to_win
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.network.port = port;
    }

    if let Some(host) = &args.host {
        config.network.host = host.clone();
    }

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting the coordinator");
        return Ok(());
    }

    display_startup_banner(&config);

    // Initialize and start the service
    info!("Initializing coordinator components...");
    let app_state = Arc::new(AppState::new(config.clone()));

    if let Err(e) = app_state.start().await {
        error!("Failed to start coordinator: {}", e);
        std::process::exit(1);
    }

    // Start periodic activity reporting
    let stats_task = {
        let app_state = Arc::clone(&app_state);
        let interval = config.stats_interval();
        tokio::spawn(async move {
            stats_report_task(app_state, interval).await;
        })
    };

    info!("✅ Duel Room Match Coordinator is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    // Wait for shutdown signal
    wait_for_shutdown_signal().await;

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");
    stats_task.abort();

    match tokio::time::timeout(config.shutdown_timeout(), app_state.shutdown()).await {
        Ok(()) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Duel Room Match Coordinator stopped");
    Ok(())
}
