use std::fmt::Write;

use serde::Serialize;

use crate::analysis::latency::{periodic_average_latency, positive_average_latency, PeriodicAverage};
use crate::packet::PacketRecord;
use crate::traffic::{AnalysisDiagnostics, CaptureAnalysis};
use crate::utils::formatting::{format_latency_us, format_timestamp};

/// Everything a chart renderer needs from one capture.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub diagnostics: AnalysisDiagnostics,
    pub average_latency_us: Option<f64>,
    pub periodic_averages: Vec<PeriodicAverage>,
    pub records: Vec<PacketRecord>,
}

impl AnalysisReport {
    pub fn new(source: &str, analysis: CaptureAnalysis, period_delimiter: u8) -> Self {
        let average_latency_us = positive_average_latency(&analysis.records);
        let periodic_averages = periodic_average_latency(&analysis.records, period_delimiter);

        Self {
            source: source.to_string(),
            diagnostics: analysis.diagnostics,
            average_latency_us,
            periodic_averages,
            records: analysis.records,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Summary without the per-packet records.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let d = &self.diagnostics;

        let _ = writeln!(out, "Capture: {}", self.source);
        let _ = writeln!(
            out,
            "Packets: {} total, {} latency ({} invalid), {} time-sync, {} other",
            d.total_frames, d.latency_frames, d.invalid_latency_frames, d.time_sync_frames, d.other_frames
        );

        match self.average_latency_us {
            Some(average) => {
                let _ = writeln!(out, "Average latency: {}", format_latency_us(average));
            },
            None => {
                let _ = writeln!(out, "Average latency: no positive samples");
            },
        }

        if !self.periodic_averages.is_empty() {
            let _ = writeln!(out, "Periodic averages:");
            for window in &self.periodic_averages {
                let _ = writeln!(
                    out,
                    "  {} .. {}  {}",
                    format_timestamp(&window.start_time),
                    format_timestamp(&window.end_time),
                    format_latency_us(window.mean_latency_us)
                );
            }
        }

        out
    }
}
