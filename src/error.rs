//! Error types for the match coordinator
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific coordinator scenarios
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Transport setup failed: {message}")]
    TransportSetup { message: String },

    #[error("Participant disconnected: {name}")]
    ParticipantDisconnected { name: String },

    #[error("Handshake failed: {reason}")]
    HandshakeFailed { reason: String },

    #[error("Invalid move token: {token}")]
    InvalidMove { token: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal coordinator error: {message}")]
    InternalError { message: String },
}
