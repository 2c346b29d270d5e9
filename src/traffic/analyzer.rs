use chrono::TimeDelta;
use log::{debug, info, warn};
use serde::Serialize;

use crate::capture::{CaptureError, FrameLayers, Timestamped};
use crate::config::AnalysisConfig;
use crate::packet::{classify, PacketCategory, PacketRecord, DEFAULT_MAX_LATENCY};

/// Frame counters gathered during a run. Purely informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisDiagnostics {
    pub total_frames: u64,
    pub latency_frames: u64,
    pub time_sync_frames: u64,
    pub invalid_latency_frames: u64,
    pub other_frames: u64,
}

impl AnalysisDiagnostics {
    fn record(&mut self, record: &PacketRecord) {
        self.total_frames += 1;
        match record.category() {
            PacketCategory::Latency => {
                self.latency_frames += 1;
                if record.has_invalid_latency() {
                    self.invalid_latency_frames += 1;
                }
            },
            PacketCategory::TimeSync => self.time_sync_frames += 1,
            PacketCategory::Other => self.other_frames += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaptureAnalysis {
    pub records: Vec<PacketRecord>,
    pub diagnostics: AnalysisDiagnostics,
}

/// Classifies every frame of a capture into a packet record.
pub struct CaptureAnalyzer {
    max_latency: TimeDelta,
}

impl CaptureAnalyzer {
    pub fn new() -> Self {
        Self {
            max_latency: DEFAULT_MAX_LATENCY,
        }
    }

    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self {
            max_latency: config.max_latency(),
        }
    }

    /// Consumes the frames in order. The first capture error aborts the whole
    /// run and nothing analysed so far is returned.
    pub fn analyze<I, F>(&self, frames: I) -> Result<CaptureAnalysis, CaptureError>
    where
        I: IntoIterator<Item = Result<F, CaptureError>>,
        F: FrameLayers + Timestamped,
    {
        let mut analysis = CaptureAnalysis::default();

        for frame in frames {
            let frame = frame?;
            let record = PacketRecord::build(classify(&frame), frame.received_at(), self.max_latency);

            if record.has_invalid_latency() {
                debug!("Probe received at {} exceeds the latency sanity bound", record.received_at());
            }

            analysis.diagnostics.record(&record);
            analysis.records.push(record);
        }

        let diagnostics = &analysis.diagnostics;
        info!(
            "Got {} packets including {} latency and {} time-sync packets",
            diagnostics.total_frames, diagnostics.latency_frames, diagnostics.time_sync_frames
        );
        if diagnostics.invalid_latency_frames > 0 {
            warn!(
                "{} latency packets exceed the {}s sanity bound",
                diagnostics.invalid_latency_frames,
                self.max_latency.num_seconds()
            );
        }

        Ok(analysis)
    }
}

impl Default for CaptureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
