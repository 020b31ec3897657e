//! Presentation-facing result bundles.
//!
//! Each metric is computed independently so one failure (say, a flat index)
//! does not hide the others. Failures carry their kind and a readable reason.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::comovement::{aligned_returns, beta, correlation_of_returns, regression_line, RegressionLine};
use crate::core::config::MetricsConfig;
use crate::core::error::ErrorKind;
use crate::core::timeseries::align_series;
use crate::core::types::PriceSeries;
use crate::core::Result;
use crate::indicators::{rsi, volatility};

/// A metric value or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricValue {
    Value { value: f64 },
    Unavailable { kind: ErrorKind, reason: String },
}

impl MetricValue {
    /// The numeric value, if available.
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value { value } => Some(*value),
            MetricValue::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Value { .. })
    }
}

impl From<Result<f64>> for MetricValue {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(value) => MetricValue::Value { value },
            Err(err) => MetricValue::Unavailable {
                kind: err.kind(),
                reason: err.to_string(),
            },
        }
    }
}

/// Key risk metrics for one stock against its benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub beta: MetricValue,
    pub volatility_pct: MetricValue,
    pub rsi: MetricValue,
}

impl StockMetrics {
    /// Compute beta, volatility and RSI for `stock` using `market` as the benchmark.
    pub fn compute(stock: &PriceSeries, market: &PriceSeries, config: &MetricsConfig) -> Self {
        let stock_closes = stock.closes();
        let (stock_window, market_window) = align_series(stock, market);

        let metrics = Self {
            beta: beta(&stock_window.closes(), &market_window.closes()).into(),
            volatility_pct: volatility(&stock_closes).into(),
            rsi: rsi(&stock_closes, config.rsi_period).into(),
        };
        debug!(
            symbol = stock.symbol(),
            benchmark = market.symbol(),
            beta = ?metrics.beta.value(),
            volatility = ?metrics.volatility_pct.value(),
            rsi = ?metrics.rsi.value(),
            "computed stock metrics"
        );
        metrics
    }
}

/// Correlation of two stocks plus the data needed to draw a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub symbol_a: String,
    pub symbol_b: String,
    pub correlation_coefficient: MetricValue,
    /// Daily returns of `a` over the common window (x axis).
    pub returns_a: Vec<f64>,
    /// Daily returns of `b` over the same window (y axis).
    pub returns_b: Vec<f64>,
    /// Least-squares line through the scatter, when it can be fitted.
    pub regression: Option<RegressionLine>,
}

impl CorrelationReport {
    /// Build the report. Fails only when no returns can be formed at all.
    pub fn compute(a: &PriceSeries, b: &PriceSeries) -> Result<Self> {
        let (a_window, b_window) = align_series(a, b);
        let (returns_a, returns_b) = aligned_returns(&a_window.closes(), &b_window.closes())?;
        let correlation_coefficient = correlation_of_returns(&returns_a, &returns_b).into();
        let regression = regression_line(&returns_a, &returns_b).ok();

        Ok(Self {
            symbol_a: a.symbol().to_string(),
            symbol_b: b.symbol().to_string(),
            correlation_coefficient,
            returns_a,
            returns_b,
            regression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_closes(symbol, start, closes).unwrap()
    }

    #[test]
    fn test_metrics_report_failures_individually() {
        let stock = series("INFY", &[100.0, 102.0, 101.0, 105.0, 107.0]);
        let flat = series("NSEI", &[10.0, 10.0, 10.0, 10.0, 10.0]);
        let metrics = StockMetrics::compute(&stock, &flat, &MetricsConfig::default());

        assert!(matches!(
            metrics.beta,
            MetricValue::Unavailable { kind: ErrorKind::NumericDegenerate, .. }
        ));
        assert_eq!(metrics.volatility_pct.value(), Some(1.76));
        assert!(matches!(
            metrics.rsi,
            MetricValue::Unavailable { kind: ErrorKind::InsufficientData, .. }
        ));
    }

    #[test]
    fn test_correlation_report_shapes() {
        let a = series("A", &[10.0, 11.0, 10.5, 12.0, 12.5]);
        let b = series("B", &[20.0, 21.0, 22.5, 22.0]);
        let report = CorrelationReport::compute(&a, &b).unwrap();
        assert_eq!(report.returns_a.len(), 3);
        assert_eq!(report.returns_b.len(), 3);
        assert!(report.correlation_coefficient.is_available());
        assert!(report.regression.is_some());
    }

    #[test]
    fn test_metric_value_serializes_with_status() {
        let json = serde_json::to_string(&MetricValue::Value { value: 1.5 }).unwrap();
        assert_eq!(json, r#"{"status":"value","value":1.5}"#);
    }
}
