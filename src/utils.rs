//! Utility functions for the match coordinator

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix for generated fallback identities
pub const FALLBACK_NAME_PREFIX: &str = "Player";

/// Upper bound (exclusive) for the fallback identity suffix
const FALLBACK_NAME_BOUND: u32 = 1000;

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Generate a display name for a participant that did not provide one
pub fn generate_fallback_name() -> String {
    let suffix = rand::thread_rng().gen_range(0..FALLBACK_NAME_BOUND);
    format!("{}{}", FALLBACK_NAME_PREFIX, suffix)
}
