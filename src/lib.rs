// Library exports for probe-latency
pub mod analysis;
pub mod capture;
pub mod config;
pub mod packet;
pub mod traffic;
pub mod utils;

pub use analysis::{latency, report};
pub use capture::{frame, pcap_source};
pub use config::settings;
pub use packet::{classifier, record};
pub use traffic::analyzer;
pub use utils::formatting;

// Error types
pub use anyhow::{Error, Result};
