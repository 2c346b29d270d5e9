pub mod frame;
pub mod pcap_source;

#[cfg(test)]
pub(crate) mod test_frames;

pub use frame::{Frame, FrameLayers, LayerKind, LinkKind, Timestamped};
pub use pcap_source::{PcapSource, CaptureError};
