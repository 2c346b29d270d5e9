use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::packet::PacketRecord;

/// Time-sync message type closing an averaging window.
pub const PERIOD_DELIMITER: u8 = 0x49;

/// Mean latency of the probes seen between two period delimiters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodicAverage {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub mean_latency_us: f64,
}

/// Average over strictly positive latencies only, the way the traffic generator
/// reports its own figures. `None` when no probe qualifies.
pub fn positive_average_latency(records: &[PacketRecord]) -> Option<f64> {
    let (sum, count) = records
        .iter()
        .filter_map(PacketRecord::latency_us)
        .filter(|latency| *latency > 0.0)
        .fold((0.0, 0u64), |(sum, count), latency| (sum + latency, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Splits the record stream into windows closed by `delimiter` sync messages
/// (and by the final record) and averages every measured latency in each,
/// negative values included. Windows without probes are skipped.
pub fn periodic_average_latency(records: &[PacketRecord], delimiter: u8) -> Vec<PeriodicAverage> {
    let mut averages = Vec::new();
    let Some(first) = records.first() else {
        return averages;
    };

    let mut window_start = first.received_at();
    let mut sum = 0.0;
    let mut count = 0u64;
    let last_index = records.len() - 1;

    for (index, record) in records.iter().enumerate() {
        if let Some(latency) = record.latency_us() {
            sum += latency;
            count += 1;
        }

        if record.is_time_sync_of(delimiter) || index == last_index {
            let window_end = record.received_at();
            if count > 0 {
                averages.push(PeriodicAverage {
                    start_time: window_start,
                    end_time: window_end,
                    mean_latency_us: sum / count as f64,
                });
            }
            window_start = window_end;
            sum = 0.0;
            count = 0;
        }
    }

    averages
}
