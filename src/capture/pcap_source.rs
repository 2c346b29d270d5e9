use chrono::{DateTime, Utc};
use log::{debug, warn};
use pcap::{Capture, Offline, Precision};

use thiserror::Error;

use crate::capture::frame::{Frame, LinkKind};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Cannot open capture '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("Capture read failed after {frames_read} frames: {reason}")]
    Read { frames_read: u64, reason: String },
}

/// Offline reader handing out decoded frames in capture order.
pub struct PcapSource {
    capture: Capture<Offline>,
    path: String,
    link: LinkKind,
    nanosecond_precision: bool,
    frames_read: u64,
}

impl PcapSource {
    pub fn open(path: &str, nanosecond_precision: bool) -> Result<Self, CaptureError> {
        let precision = if nanosecond_precision {
            Precision::Nano
        } else {
            Precision::Micro
        };

        let capture = Capture::from_file_with_precision(path, precision).map_err(|e| CaptureError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let link = LinkKind::from_dlt(capture.get_datalink().0);
        if let LinkKind::Unsupported(dlt) = link {
            warn!("Link type {} in {} is not decoded; all frames will classify as other traffic", dlt, path);
        }
        debug!("Opened {} (link {:?}, nanosecond precision: {})", path, link, nanosecond_precision);

        Ok(PcapSource {
            capture,
            path: path.to_string(),
            link,
            nanosecond_precision,
            frames_read: 0,
        })
    }

    pub fn link_kind(&self) -> LinkKind {
        self.link
    }
}

impl Iterator for PcapSource {
    type Item = Result<Frame, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.link;
        let nanosecond_precision = self.nanosecond_precision;

        match self.capture.next_packet() {
            Ok(packet) => {
                self.frames_read += 1;
                let seconds = packet.header.ts.tv_sec as i64;
                let fraction = packet.header.ts.tv_usec as i64;
                let received_at = header_timestamp(seconds, fraction, nanosecond_precision);
                Some(Ok(Frame::decode(link, received_at, packet.data.to_vec())))
            },
            Err(pcap::Error::NoMorePackets) => {
                debug!("Reached end of {} after {} frames", self.path, self.frames_read);
                None
            },
            Err(e) => Some(Err(CaptureError::Read {
                frames_read: self.frames_read,
                reason: e.to_string(),
            })),
        }
    }
}

/// Converts a pcap record header timestamp to UTC. The sub-second field holds
/// microseconds or nanoseconds depending on the precision the file was opened with;
/// values of a second or more (or negative ones) carry over into the seconds.
fn header_timestamp(seconds: i64, fraction: i64, nanosecond_precision: bool) -> DateTime<Utc> {
    const NANOS_PER_SECOND: i64 = 1_000_000_000;

    let fraction_nanos = if nanosecond_precision {
        fraction
    } else {
        fraction.saturating_mul(1_000)
    };
    let seconds = seconds.saturating_add(fraction_nanos.div_euclid(NANOS_PER_SECOND));
    let nanos = fraction_nanos.rem_euclid(NANOS_PER_SECOND) as u32;

    // record headers hold 32-bit fields, well inside chrono's range
    DateTime::from_timestamp(seconds, nanos).unwrap_or(if seconds < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
