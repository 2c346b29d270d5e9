use anyhow::Context;
use chrono::TimeDelta;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::analysis::PERIOD_DELIMITER;
use crate::Result;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub input: Option<String>,
    pub nanosecond_precision: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_latency_ms: u64,
    pub period_delimiter: u8,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            nanosecond_precision: true,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_latency_ms: 10_000,
            period_delimiter: PERIOD_DELIMITER,
        }
    }
}

impl AnalysisConfig {
    pub fn max_latency(&self) -> TimeDelta {
        i64::try_from(self.max_latency_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Cannot write config file {}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.capture.nanosecond_precision);
        assert_eq!(config.analysis.period_delimiter, 0x49);
        assert_eq!(config.analysis.max_latency(), TimeDelta::seconds(10));
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            period_delimiter = 9

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.period_delimiter, 0x09);
        assert_eq!(config.analysis.max_latency_ms, 10_000);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.capture.input.is_none());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("probe-latency-config-{}.toml", std::process::id()));
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.capture.input = Some("trace.pcap".to_string());
        config.analysis.max_latency_ms = 2_500;
        config.save_to_file(path).unwrap();

        let loaded = Config::load_from_file(path).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded.capture.input.as_deref(), Some("trace.pcap"));
        assert_eq!(loaded.analysis, config.analysis);
    }

    #[test]
    fn test_oversized_sanity_bound_saturates() {
        let config = AnalysisConfig {
            max_latency_ms: u64::MAX,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.max_latency(), TimeDelta::MAX);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(Config::load_from_file("/nonexistent/probe-latency.toml").is_err());
    }
}
