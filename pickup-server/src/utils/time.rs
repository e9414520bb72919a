//! Time helpers
//!
//! All persistence uses Unix millis (`i64`); conversion to display formats
//! happens at the client, never in the repository layer.

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp in seconds (webhook signature tolerance checks)
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
