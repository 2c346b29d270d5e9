pub mod classifier;
pub mod record;

pub use classifier::{classify, parse_probe_trailer, parse_time_sync, Classification, ProbeTrailer};
pub use record::{Latency, PacketCategory, PacketRecord, DEFAULT_MAX_LATENCY};
