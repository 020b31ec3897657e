//! PyO3 function bindings for equilens.

use chrono::NaiveDate;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::cancel::CancelFlag;
use crate::core::config::{ForecastConfig, MetricsConfig, SimulationConfig};
use crate::core::error::AnalyticsError;
use crate::core::types::{PricePoint, PriceSeries, SeriesOrder};
use crate::forecast::Forecaster;
use crate::indicators;
use crate::metrics::{self, CorrelationReport, MetricValue, StockMetrics};
use crate::portfolio::{run_efficient_frontier_analysis, Portfolio};

use super::numpy_bridge::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn order_of(newest_first: bool) -> SeriesOrder {
    if newest_first {
        SeriesOrder::NewestFirst
    } else {
        SeriesOrder::OldestFirst
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| AnalyticsError::invalid_parameter(format!("bad date '{}': {}", s, e)))
}

// ============================================================================
// Series
// ============================================================================

/// Daily OHLCV series. Stored oldest-first whatever the input order.
#[pyclass(name = "PriceSeries")]
#[derive(Debug, Clone)]
pub struct PyPriceSeries {
    inner: PriceSeries,
}

#[pymethods]
impl PyPriceSeries {
    #[new]
    #[pyo3(signature = (symbol, dates, open, high, low, close, volume, newest_first=false))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        symbol: String,
        dates: Vec<String>,
        open: PyReadonlyArray1<f64>,
        high: PyReadonlyArray1<f64>,
        low: PyReadonlyArray1<f64>,
        close: PyReadonlyArray1<f64>,
        volume: PyReadonlyArray1<f64>,
        newest_first: bool,
    ) -> PyResult<Self> {
        let n = dates.len();
        let columns = [
            numpy_to_vec_f64(&open),
            numpy_to_vec_f64(&high),
            numpy_to_vec_f64(&low),
            numpy_to_vec_f64(&close),
            numpy_to_vec_f64(&volume),
        ];
        if let Some(bad) = columns.iter().find(|c| c.len() != n) {
            return Err(AnalyticsError::length_mismatch(n, bad.len()).into());
        }
        let [open, high, low, close, volume] = columns;

        let points = dates
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Ok(PricePoint::new(
                    parse_date(d)?,
                    open[i],
                    high[i],
                    low[i],
                    close[i],
                    volume[i].max(0.0).round() as u64,
                ))
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        let inner = PriceSeries::from_points(symbol, points, order_of(newest_first))?;
        Ok(Self { inner })
    }

    /// Closes-only series on consecutive calendar days from `start_date`.
    #[staticmethod]
    #[pyo3(signature = (symbol, closes, start_date="2000-01-01", newest_first=false))]
    fn from_closes(
        symbol: String,
        closes: PyReadonlyArray1<f64>,
        start_date: &str,
        newest_first: bool,
    ) -> PyResult<Self> {
        let closes = numpy_to_oldest_first(&closes, newest_first);
        let inner = PriceSeries::from_closes(symbol, parse_date(start_date)?, &closes)?;
        Ok(Self { inner })
    }

    #[getter]
    fn symbol(&self) -> String {
        self.inner.symbol().to_string()
    }

    fn closes<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(py, self.inner.closes())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "PriceSeries(symbol={}, len={}, last_date={:?})",
            self.inner.symbol(),
            self.inner.len(),
            self.inner.last_date()
        )
    }
}

// ============================================================================
// Metrics
// ============================================================================

fn set_metric(dict: &PyDict, errors: &PyDict, name: &str, metric: &MetricValue) -> PyResult<()> {
    dict.set_item(name, metric.value())?;
    if let MetricValue::Unavailable { reason, .. } = metric {
        errors.set_item(name, reason)?;
    }
    Ok(())
}

/// Beta, volatility and RSI of `stock` against `market`.
///
/// Each metric is `None` when it cannot be computed; the reason is under `errors`.
#[pyfunction]
#[pyo3(signature = (stock, market, rsi_period=14))]
pub fn stock_metrics<'py>(
    py: Python<'py>,
    stock: &PyPriceSeries,
    market: &PyPriceSeries,
    rsi_period: usize,
) -> PyResult<&'py PyDict> {
    let config = MetricsConfig { rsi_period };
    config.validate()?;
    let metrics = StockMetrics::compute(&stock.inner, &market.inner, &config);

    let dict = PyDict::new(py);
    let errors = PyDict::new(py);
    set_metric(dict, errors, "beta", &metrics.beta)?;
    set_metric(dict, errors, "volatility_pct", &metrics.volatility_pct)?;
    set_metric(dict, errors, "rsi", &metrics.rsi)?;
    dict.set_item("errors", errors)?;
    Ok(dict)
}

/// Correlation of daily returns plus scatter data.
#[pyfunction]
pub fn correlation<'py>(py: Python<'py>, a: &PyPriceSeries, b: &PyPriceSeries) -> PyResult<&'py PyDict> {
    let report = CorrelationReport::compute(&a.inner, &b.inner)?;

    let dict = PyDict::new(py);
    let errors = PyDict::new(py);
    dict.set_item("symbol_a", &report.symbol_a)?;
    dict.set_item("symbol_b", &report.symbol_b)?;
    set_metric(dict, errors, "correlation_coefficient", &report.correlation_coefficient)?;
    dict.set_item("returns_a", vec_to_numpy_f64(py, report.returns_a))?;
    dict.set_item("returns_b", vec_to_numpy_f64(py, report.returns_b))?;
    if let Some(line) = report.regression {
        dict.set_item("slope", line.slope)?;
        dict.set_item("intercept", line.intercept)?;
    }
    dict.set_item("errors", errors)?;
    Ok(dict)
}

// ============================================================================
// Efficient frontier
// ============================================================================

fn portfolio_dict<'py>(py: Python<'py>, symbols: &[String], portfolio: &Portfolio) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    let weights = PyDict::new(py);
    for (symbol, weight) in symbols.iter().zip(&portfolio.weights) {
        weights.set_item(symbol, *weight)?;
    }
    dict.set_item("weights", weights)?;
    dict.set_item("expected_return", portfolio.expected_return)?;
    dict.set_item("risk", portfolio.risk)?;
    dict.set_item("sharpe_ratio", portfolio.sharpe_ratio)?;
    Ok(dict)
}

/// Monte Carlo efficient frontier over `assets`.
///
/// With `max_risk`, also returns the best-return portfolio within that risk.
#[pyfunction]
#[pyo3(signature = (assets, trials=5000, seed=42, max_risk=None))]
pub fn efficient_frontier<'py>(
    py: Python<'py>,
    assets: Vec<PyRef<'py, PyPriceSeries>>,
    trials: usize,
    seed: u64,
    max_risk: Option<f64>,
) -> PyResult<&'py PyDict> {
    let series: Vec<PriceSeries> = assets.iter().map(|a| a.inner.clone()).collect();
    let config = SimulationConfig::default().with_trials(trials).with_seed(seed);
    config.validate()?;

    let analysis = py.allow_threads(|| run_efficient_frontier_analysis(&series, &config, &CancelFlag::new()))?;

    let dict = PyDict::new(py);
    dict.set_item("symbols", analysis.symbols.clone())?;
    dict.set_item("mean_returns", analysis.mean_returns.clone())?;
    dict.set_item("covariance", analysis.covariance.rows().to_vec())?;
    dict.set_item("min_variance", portfolio_dict(py, &analysis.symbols, &analysis.min_variance)?)?;
    dict.set_item("best", portfolio_dict(py, &analysis.symbols, &analysis.best)?)?;

    let (risks, returns): (Vec<f64>, Vec<f64>) = analysis
        .trials
        .iter()
        .map(|p| (p.risk, p.expected_return))
        .unzip();
    dict.set_item("trial_risk", vec_to_numpy_f64(py, risks))?;
    dict.set_item("trial_return", vec_to_numpy_f64(py, returns))?;

    let (frontier_risk, frontier_return): (Vec<f64>, Vec<f64>) = analysis
        .frontier()
        .iter()
        .map(|p| (p.risk, p.expected_return))
        .unzip();
    dict.set_item("frontier_risk", vec_to_numpy_f64(py, frontier_risk))?;
    dict.set_item("frontier_return", vec_to_numpy_f64(py, frontier_return))?;

    if let Some(max_risk) = max_risk {
        let efficient = analysis.efficient_portfolio(max_risk)?;
        dict.set_item("efficient", portfolio_dict(py, &analysis.symbols, efficient)?)?;
    }
    Ok(dict)
}

// ============================================================================
// Forecast
// ============================================================================

/// Train an LSTM on `stock` (plus companion index closes) and predict `horizon` closes.
///
/// `progress`, if given, is called as `progress(pct, loss)` after every epoch.
/// `config_json` overrides forecaster settings, e.g. `{"epochs": 20}`.
#[pyfunction]
#[pyo3(signature = (stock, companions=Vec::new(), horizon=5, config_json=None, progress=None))]
pub fn forecast_closes<'py>(
    py: Python<'py>,
    stock: &PyPriceSeries,
    companions: Vec<PyRef<'py, PyPriceSeries>>,
    horizon: usize,
    config_json: Option<&str>,
    progress: Option<PyObject>,
) -> PyResult<&'py PyDict> {
    let config: ForecastConfig = match config_json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| AnalyticsError::invalid_parameter(format!("forecast config: {}", e)))?,
        None => ForecastConfig::default(),
    };
    let forecaster = Forecaster::new(config)?;
    let companions: Vec<PriceSeries> = companions.iter().map(|c| c.inner.clone()).collect();

    let stock = stock.inner.clone();
    if horizon == 0 {
        return Err(AnalyticsError::invalid_parameter("forecast horizon must be > 0").into());
    }

    let prepared = py.allow_threads(|| forecaster.prepare(&stock, &companions))?;
    let handle = forecaster.spawn_training(&prepared, CancelFlag::new())?;
    let events = handle.progress().clone();

    // The GIL is held only while the callback runs.
    let mut callback_error: Option<PyErr> = None;
    while let Ok(event) = py.allow_threads(|| events.recv()) {
        if callback_error.is_some() {
            continue;
        }
        if let Some(cb) = &progress {
            if let Err(e) = cb.call1(py, (event.progress_pct, event.loss)) {
                handle.cancel();
                callback_error = Some(e);
            }
        }
    }
    let trained = py.allow_threads(move || handle.join());
    if let Some(e) = callback_error {
        return Err(e);
    }
    let trained = trained?;
    let forecast = py.allow_threads(|| forecaster.finish(stock.symbol(), &prepared, trained, horizon));

    let dict = PyDict::new(py);
    dict.set_item("symbol", &forecast.symbol)?;
    dict.set_item("last_date", forecast.last_date.map(|d| d.format(DATE_FORMAT).to_string()))?;
    dict.set_item("predicted_closes", vec_to_numpy_f64(py, forecast.predicted_closes))?;
    dict.set_item("loss_history", vec_to_numpy_f64(py, forecast.loss_history))?;
    let importance = PyDict::new(py);
    for weight in &forecast.feature_importance {
        importance.set_item(&weight.name, weight.importance)?;
    }
    dict.set_item("feature_importance", importance)?;
    Ok(dict)
}

// ============================================================================
// Indicator Functions
// ============================================================================

/// Wilder RSI of the latest close.
#[pyfunction]
#[pyo3(signature = (closes, period=14, newest_first=false))]
pub fn rsi(closes: PyReadonlyArray1<f64>, period: usize, newest_first: bool) -> PyResult<f64> {
    let closes = numpy_to_oldest_first(&closes, newest_first);
    Ok(indicators::rsi(&closes, period)?)
}

/// Daily volatility in percent.
#[pyfunction]
#[pyo3(signature = (closes, newest_first=false))]
pub fn volatility(closes: PyReadonlyArray1<f64>, newest_first: bool) -> PyResult<f64> {
    let closes = numpy_to_oldest_first(&closes, newest_first);
    Ok(indicators::volatility(&closes)?)
}

/// Beta of `stock` closes against `market` closes.
#[pyfunction]
#[pyo3(signature = (stock, market, newest_first=false))]
pub fn beta(stock: PyReadonlyArray1<f64>, market: PyReadonlyArray1<f64>, newest_first: bool) -> PyResult<f64> {
    let stock = numpy_to_oldest_first(&stock, newest_first);
    let market = numpy_to_oldest_first(&market, newest_first);
    Ok(metrics::beta(&stock, &market)?)
}

/// Fractional daily returns, oldest first.
#[pyfunction]
#[pyo3(signature = (closes, newest_first=false))]
pub fn daily_returns<'py>(
    py: Python<'py>,
    closes: PyReadonlyArray1<f64>,
    newest_first: bool,
) -> PyResult<&'py PyArray1<f64>> {
    let closes = numpy_to_oldest_first(&closes, newest_first);
    let returns = crate::core::timeseries::daily_returns(&closes)?;
    Ok(vec_to_numpy_f64(py, returns))
}
