use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::packet::classifier::{Classification, ProbeTrailer};

/// Latency measurements beyond this magnitude are treated as clock garbage.
pub const DEFAULT_MAX_LATENCY: TimeDelta = TimeDelta::seconds(10);

/// Plot magnitude for traffic that is neither a probe nor a sync message.
const OTHER_PLOT_VALUE: f64 = 5.0;
/// Offset lifting sync messages above background traffic on the chart.
const TIME_SYNC_PLOT_BASE: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketCategory {
    Latency,
    TimeSync,
    Other,
}

/// One-way latency of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// Receive time minus embedded send time; negative when clocks disagree.
    Measured(TimeDelta),
    /// Magnitude exceeded the sanity bound.
    Invalid,
}

impl Latency {
    pub fn between(sent_at: DateTime<Utc>, received_at: DateTime<Utc>, max_latency: TimeDelta) -> Self {
        let delta = received_at - sent_at;
        if delta.abs() > max_latency {
            Latency::Invalid
        } else {
            Latency::Measured(delta)
        }
    }

    pub fn as_micros(&self) -> Option<f64> {
        match self {
            Latency::Measured(delta) => delta.num_nanoseconds().map(|ns| ns as f64 / 1000.0),
            Latency::Invalid => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Latency::Invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum PacketRecord {
    Latency {
        received_at: DateTime<Utc>,
        probe: ProbeTrailer,
        #[serde(rename = "latency_us", serialize_with = "serialize_latency")]
        latency: Latency,
    },
    TimeSync {
        received_at: DateTime<Utc>,
        message_type: u8,
    },
    Other {
        received_at: DateTime<Utc>,
    },
}

impl PacketRecord {
    pub fn build(classification: Classification, received_at: DateTime<Utc>, max_latency: TimeDelta) -> Self {
        match classification {
            Classification::Latency(probe) => PacketRecord::Latency {
                received_at,
                probe,
                latency: Latency::between(probe.sent_at, received_at, max_latency),
            },
            Classification::TimeSync { message_type } => PacketRecord::TimeSync {
                received_at,
                message_type,
            },
            Classification::Other => PacketRecord::Other { received_at },
        }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        match self {
            PacketRecord::Latency { received_at, .. }
            | PacketRecord::TimeSync { received_at, .. }
            | PacketRecord::Other { received_at } => *received_at,
        }
    }

    pub fn category(&self) -> PacketCategory {
        match self {
            PacketRecord::Latency { .. } => PacketCategory::Latency,
            PacketRecord::TimeSync { .. } => PacketCategory::TimeSync,
            PacketRecord::Other { .. } => PacketCategory::Other,
        }
    }

    /// Latency in microseconds; `None` for invalid probes and non-probe records.
    pub fn latency_us(&self) -> Option<f64> {
        match self {
            PacketRecord::Latency { latency, .. } => latency.as_micros(),
            _ => None,
        }
    }

    /// Magnitude to plot for this record. Only invalid probes have none.
    pub fn value(&self) -> Option<f64> {
        match self {
            PacketRecord::Latency { latency, .. } => latency.as_micros(),
            PacketRecord::TimeSync { message_type, .. } => Some(TIME_SYNC_PLOT_BASE + f64::from(*message_type)),
            PacketRecord::Other { .. } => Some(OTHER_PLOT_VALUE),
        }
    }

    pub fn is_time_sync_of(&self, message_type: u8) -> bool {
        matches!(self, PacketRecord::TimeSync { message_type: m, .. } if *m == message_type)
    }

    pub fn has_invalid_latency(&self) -> bool {
        matches!(self, PacketRecord::Latency { latency, .. } if latency.is_invalid())
    }
}

fn serialize_latency<S: Serializer>(latency: &Latency, serializer: S) -> Result<S::Ok, S::Error> {
    latency.as_micros().serialize(serializer)
}
