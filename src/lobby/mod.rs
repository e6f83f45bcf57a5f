//! Matchmaking for the coordinator
//!
//! This module holds the waiting pool of unmatched participants and the
//! matchmaker loop that drains it pairwise into sessions.

pub mod matchmaker;
pub mod pool;

// Re-export commonly used types
pub use matchmaker::{Matchmaker, MatchmakerStats};
pub use pool::WaitingPool;
