//! ID generation utilities for Gepetto
//!
//! Session IDs only need to be unique within one process.

use std::sync::atomic::{AtomicU32, Ordering};

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Generate a backend session ID
///
/// Format: `{prefix}-{timestamp_ms}-{sequence_hex}`
/// Example: `llm-1738300800123-0001`
pub fn generate_session_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xffff;
    format!("{}-{}-{:04x}", prefix, now_ms(), seq)
}
