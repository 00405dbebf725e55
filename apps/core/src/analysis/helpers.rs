//! Small formatting helpers shared across the analysis modules.

use chrono::{DateTime, Utc};

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Relative age of a unix timestamp measured against `now`.
pub fn time_ago_from(timestamp: i64, now: DateTime<Utc>) -> String {
    let Some(then) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
        return "Unknown".to_string();
    };

    let diff = now.signed_duration_since(then);
    if diff.num_seconds() < 0 {
        return "Unknown".to_string();
    }

    let days = diff.num_days();
    // seconds within the current day
    let seconds = diff.num_seconds() - days * 86_400;

    if days > 0 {
        format!("{}d ago", days)
    } else if seconds > 3600 {
        format!("{}h ago", seconds / 3600)
    } else if seconds > 60 {
        format!("{}m ago", seconds / 60)
    } else {
        "Just now".to_string()
    }
}

pub fn time_ago(timestamp: i64) -> String {
    time_ago_from(timestamp, Utc::now())
}
