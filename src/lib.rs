//! Duel Room - TCP match coordinator for rock-paper-scissors duels
//!
//! This crate accepts concurrent connections, pairs waiting participants into
//! two-player sessions, and drives a scored best-of-three match protocol over
//! a newline-delimited text channel, with rematch negotiation and return to a
//! waiting pool.

pub mod config;
pub mod error;
pub mod lobby;
pub mod net;
pub mod protocol;
pub mod service;
pub mod session;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types and traits
pub use error::{CoordinatorError, Result};
pub use types::*;

// Re-export key components
pub use lobby::{Matchmaker, WaitingPool};
pub use net::PlayerConnection;
pub use service::AppState;
pub use session::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
