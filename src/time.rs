//! Generation timestamps.
//!
//! The scanner never reads the wall clock directly; it is handed a [`Clock`]
//! so tests can pin `generatedAt`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the `generatedAt` stamp
pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Render an epoch-millisecond stamp as RFC 3339 (UTC), or the raw number if out of range
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| millis.to_string())
}
