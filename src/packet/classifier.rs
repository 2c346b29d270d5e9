use chrono::{DateTime, Utc};
use log::trace;
use serde::Serialize;

use crate::capture::{FrameLayers, LayerKind};

/// First byte of the trailer the traffic generator appends to latency probes.
pub const PROBE_MAGIC: u8 = 0xab;
pub const PROBE_TRAILER_LEN: usize = 16;

/// Sync, delay-request and follow-up messages.
const SHORT_TIME_SYNC_TYPES: [u8; 3] = [0x00, 0x01, 0x08];
const SHORT_TIME_SYNC_LEN: usize = 44;
/// Delay-response message.
const LONG_TIME_SYNC_TYPE: u8 = 0x09;
const LONG_TIME_SYNC_LEN: usize = 54;

/// Fields decoded from a latency probe trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeTrailer {
    pub flow_id: u8,
    pub hardware_id: u16,
    pub sequence: u32,
    pub sent_at: DateTime<Utc>,
}

/// Outcome of running the classification rules over one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Latency(ProbeTrailer),
    TimeSync { message_type: u8 },
    Other,
}

/// Applies the rules in priority order: latency probe, time-sync directly over
/// Ethernet, time-sync over IPv4/UDP, then everything else.
pub fn classify<L: FrameLayers + ?Sized>(layers: &L) -> Classification {
    if let Some(probe) = match_latency_probe(layers) {
        return Classification::Latency(probe);
    }
    if let Some(message_type) = match_time_sync_over_ethernet(layers) {
        return Classification::TimeSync { message_type };
    }
    if let Some(message_type) = match_time_sync_over_udp(layers) {
        return Classification::TimeSync { message_type };
    }
    Classification::Other
}

fn match_latency_probe<L: FrameLayers + ?Sized>(layers: &L) -> Option<ProbeTrailer> {
    let payload = layers.payload(LayerKind::Ipv4)?;
    let probe = parse_probe_trailer(payload);
    if probe.is_none() {
        trace!("IPv4 payload of {} bytes carries no probe trailer", payload.len());
    }
    probe
}

fn match_time_sync_over_ethernet<L: FrameLayers + ?Sized>(layers: &L) -> Option<u8> {
    parse_time_sync(layers.payload(LayerKind::Ethernet)?)
}

fn match_time_sync_over_udp<L: FrameLayers + ?Sized>(layers: &L) -> Option<u8> {
    layers.payload(LayerKind::Ipv4)?;
    parse_time_sync(layers.payload(LayerKind::Udp)?)
}

/// Decodes the probe trailer occupying the last 16 bytes of an IPv4 payload,
/// whatever upper-layer protocol carries it.
pub fn parse_probe_trailer(ipv4_payload: &[u8]) -> Option<ProbeTrailer> {
    let start = ipv4_payload.len().checked_sub(PROBE_TRAILER_LEN)?;
    let trailer = &ipv4_payload[start..];
    if trailer[0] != PROBE_MAGIC {
        return None;
    }

    let hardware_id = u16::from_le_bytes([trailer[2], trailer[3]]);
    let sequence = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    let sent_ns = u64::from_le_bytes([
        trailer[8], trailer[9], trailer[10], trailer[11],
        trailer[12], trailer[13], trailer[14], trailer[15],
    ]);

    Some(ProbeTrailer {
        flow_id: trailer[1],
        hardware_id,
        sequence,
        sent_at: timestamp_from_nanos(sent_ns),
    })
}

fn timestamp_from_nanos(ns_total: u64) -> DateTime<Utc> {
    let seconds = (ns_total / 1_000_000_000) as i64;
    let nanos = (ns_total % 1_000_000_000) as u32;
    // u64::MAX nanoseconds is still within year 2554
    DateTime::from_timestamp(seconds, nanos).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Returns the message type byte when the payload has the exact length its
/// type requires.
pub fn parse_time_sync(payload: &[u8]) -> Option<u8> {
    let message_type = *payload.first()?;
    let expected_len = if SHORT_TIME_SYNC_TYPES.contains(&message_type) {
        SHORT_TIME_SYNC_LEN
    } else if message_type == LONG_TIME_SYNC_TYPE {
        LONG_TIME_SYNC_LEN
    } else {
        return None;
    };

    (payload.len() == expected_len).then_some(message_type)
}
