use chrono::{DateTime, Duration, Utc};

use crate::services::lifecycle::duration_seconds;

/// Epoch seconds with millisecond resolution, the unit every timestamp is
/// exposed in (e.g. `1042.37`).
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

pub fn elapsed_seconds(elapsed: Duration) -> f64 {
    duration_seconds(elapsed)
}
