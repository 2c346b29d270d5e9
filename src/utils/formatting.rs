use chrono::{DateTime, Utc};

/// Format a latency given in microseconds (ns, µs, ms, s)
pub fn format_latency_us(micros: f64) -> String {
    let magnitude = micros.abs();

    if magnitude < 1.0 {
        format!("{:.0} ns", micros * 1000.0)
    } else if magnitude < 1000.0 {
        format!("{:.3} µs", micros)
    } else if magnitude < 1_000_000.0 {
        format!("{:.3} ms", micros / 1000.0)
    } else {
        format!("{:.3} s", micros / 1_000_000.0)
    }
}

/// Format a receive timestamp with nanosecond resolution
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.9f UTC").to_string()
}
