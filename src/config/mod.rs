pub mod settings;

pub use settings::{Config, CaptureConfig, AnalysisConfig, OutputConfig, OutputFormat};
