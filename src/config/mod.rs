//! Configuration management for the match coordinator

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, GameSettings, NetworkSettings, ServiceSettings};
