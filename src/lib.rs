// Suppress warning from PyO3 macro expansion (fixed in newer PyO3 versions)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

//! equilens - equity analytics engine.
//!
//! This crate provides:
//! - Daily return computation and series alignment
//! - Risk metrics (volatility, beta, RSI) and return correlation
//! - Monte Carlo efficient frontier simulation
//! - LSTM close price forecasting with multi-day rollout
//!
//! All prices are oldest-first. Newest-first data is reordered once, when a
//! [`core::PriceSeries`] is built with [`core::SeriesOrder::NewestFirst`].

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod core;
pub mod data;
pub mod forecast;
pub mod indicators;
pub mod metrics;
pub mod portfolio;
#[cfg(feature = "python")]
pub mod python;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _equilens(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::bindings::PyPriceSeries>()?;

    // Analyses
    m.add_function(wrap_pyfunction!(python::bindings::stock_metrics, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::correlation, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::efficient_frontier, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::forecast_closes, m)?)?;

    // Single-series functions
    m.add_function(wrap_pyfunction!(python::bindings::rsi, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::volatility, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::beta, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::daily_returns, m)?)?;

    Ok(())
}
