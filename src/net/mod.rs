//! Network layer for the match coordinator
//!
//! This module wraps raw byte streams in line-oriented transports and manages
//! per-participant connection state (identity, liveness, handshake).

pub mod connection;
pub mod transport;

// Re-export commonly used types
pub use connection::PlayerConnection;
pub use transport::{LineTransport, StreamLineTransport};
