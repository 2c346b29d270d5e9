pub mod analyzer;

pub use analyzer::{CaptureAnalyzer, CaptureAnalysis, AnalysisDiagnostics};
