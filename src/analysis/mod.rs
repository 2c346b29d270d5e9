pub mod latency;
pub mod report;

pub use latency::{positive_average_latency, periodic_average_latency, PeriodicAverage, PERIOD_DELIMITER};
pub use report::AnalysisReport;
