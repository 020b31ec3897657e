//! Risk and co-movement metrics for equilens.

pub mod comovement;
pub mod report;

pub use comovement::{beta, correlation, regression_line, Point, RegressionLine};
pub use report::{CorrelationReport, MetricValue, StockMetrics};
