//! Volatility of daily returns.

use crate::core::stats::{population_variance, round_to};
use crate::core::timeseries::daily_returns;
use crate::core::Result;

/// Daily return volatility in percent.
///
/// # Arguments
/// * `closes` - Close prices, oldest first
///
/// # Returns
/// Population standard deviation of daily returns × 100, rounded to 2 decimals.
/// Fewer than 2 closes is an `InsufficientData` error.
pub fn volatility(closes: &[f64]) -> Result<f64> {
    let returns = daily_returns(closes)?;
    let std = population_variance(&returns).sqrt();
    Ok(round_to(std * 100.0, 2))
}
