//! Co-movement statistics between two series: beta, correlation, regression line.
//!
//! Variance convention: `beta` uses population moments (÷ n) like `volatility`,
//! while `correlation` uses sample moments (÷ n − 1). Both conventions are kept
//! so outputs stay comparable with historical reports.

use serde::{Deserialize, Serialize};

use crate::core::error::AnalyticsError;
use crate::core::stats::{
    mean, population_covariance, population_variance, round_to, sample_covariance,
    sample_variance,
};
use crate::core::timeseries::{align_by_trimming, daily_returns};
use crate::core::Result;

/// Returns of two close series over their common most recent window.
///
/// Both outputs have the same length, one less than the common window.
pub fn aligned_returns(closes_a: &[f64], closes_b: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    let (a, b) = align_by_trimming(closes_a, closes_b);
    if a.len() < 2 {
        return Err(AnalyticsError::insufficient_data("aligned returns", 2, a.len()));
    }
    let returns_a = daily_returns(a)?;
    let returns_b = daily_returns(b)?;
    if returns_a.len() != returns_b.len() {
        return Err(AnalyticsError::alignment_mismatch(returns_a.len(), returns_b.len()));
    }
    Ok((returns_a, returns_b))
}

/// Beta of a stock against a market index.
///
/// # Arguments
/// * `stock` - Stock closes, oldest first
/// * `market` - Benchmark closes, oldest first
///
/// # Returns
/// `cov(stock, market) / var(market)` over daily returns (population moments).
/// A flat benchmark yields `DegenerateVariance`.
pub fn beta(stock: &[f64], market: &[f64]) -> Result<f64> {
    let (stock_returns, market_returns) = aligned_returns(stock, market)?;

    let market_variance = population_variance(&market_returns);
    if market_variance == 0.0 {
        return Err(AnalyticsError::degenerate("beta (zero market variance)"));
    }

    Ok(population_covariance(&stock_returns, &market_returns) / market_variance)
}

/// Pearson correlation of daily returns, rounded to 2 decimals.
///
/// Uses sample covariance and sample standard deviations. At least two returns
/// (three aligned closes) are required.
pub fn correlation(closes_a: &[f64], closes_b: &[f64]) -> Result<f64> {
    let (returns_a, returns_b) = aligned_returns(closes_a, closes_b)?;
    correlation_of_returns(&returns_a, &returns_b)
}

/// Pearson correlation of two already computed return series.
pub fn correlation_of_returns(returns_a: &[f64], returns_b: &[f64]) -> Result<f64> {
    if returns_a.len() != returns_b.len() {
        return Err(AnalyticsError::alignment_mismatch(returns_a.len(), returns_b.len()));
    }
    if returns_a.len() < 2 {
        return Err(AnalyticsError::insufficient_data("correlation", 2, returns_a.len()));
    }

    let std_a = sample_variance(returns_a).sqrt();
    let std_b = sample_variance(returns_b).sqrt();
    if std_a * std_b == 0.0 {
        return Err(AnalyticsError::degenerate("correlation (zero standard deviation)"));
    }

    Ok(round_to(sample_covariance(returns_a, returns_b) / (std_a * std_b), 2))
}

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Ordinary least-squares fit and its endpoints over the sampled x range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    /// `(min x, predicted)` and `(max x, predicted)`.
    pub endpoints: [Point; 2],
}

impl RegressionLine {
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares line through paired samples.
pub fn regression_line(xs: &[f64], ys: &[f64]) -> Result<RegressionLine> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::length_mismatch(xs.len(), ys.len()));
    }
    if xs.len() < 2 {
        return Err(AnalyticsError::insufficient_data("regression line", 2, xs.len()));
    }

    let x_variance = population_variance(xs);
    if x_variance == 0.0 {
        return Err(AnalyticsError::degenerate("regression line (constant x)"));
    }

    let slope = population_covariance(xs, ys) / x_variance;
    let intercept = mean(ys) - slope * mean(xs);

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(RegressionLine {
        slope,
        intercept,
        endpoints: [
            Point { x: min_x, y: slope * min_x + intercept },
            Point { x: max_x, y: slope * max_x + intercept },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_of_doubled_moves() {
        // Stock moves are exactly twice the market's fractional moves
        let market = [100.0, 101.0, 99.0, 102.0];
        let market_returns = daily_returns(&market).unwrap();
        let mut stock = vec![50.0];
        for r in &market_returns {
            let last = *stock.last().unwrap();
            stock.push(last * (1.0 + 2.0 * r));
        }
        assert!((beta(&stock, &market).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_beta_flat_market() {
        let err = beta(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap_err();
        assert!(matches!(err, AnalyticsError::DegenerateVariance { .. }));
    }

    #[test]
    fn test_beta_uses_most_recent_overlap() {
        let market = [10.0, 11.0, 12.0, 11.0];
        let stock = [999.0, 10.0, 11.0, 12.0, 11.0];
        assert!((beta(&stock, &market).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_needs_two_returns() {
        let err = correlation(&[1.0, 2.0], &[2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }

    #[test]
    fn test_invalid_closes_are_rejected() {
        let good = [100.0, 101.0, 99.0, 102.0];
        for bad in [
            [100.0, f64::NAN, 99.0, 102.0],
            [100.0, f64::NEG_INFINITY, 99.0, 102.0],
            [100.0, 101.0, -99.0, 102.0],
        ] {
            assert!(matches!(beta(&bad, &good).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
            assert!(matches!(beta(&good, &bad).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
            assert!(matches!(correlation(&bad, &good).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn test_regression_line_exact_fit() {
        let line = regression_line(&[3.0, 1.0, 2.0], &[7.0, 3.0, 5.0]).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert_eq!(line.endpoints[0].x, 1.0);
        assert!((line.endpoints[0].y - 3.0).abs() < 1e-12);
        assert_eq!(line.endpoints[1].x, 3.0);
        assert!((line.endpoints[1].y - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_line_degenerate() {
        assert!(regression_line(&[1.0], &[1.0]).is_err());
        assert!(matches!(
            regression_line(&[2.0, 2.0], &[1.0, 3.0]).unwrap_err(),
            AnalyticsError::DegenerateVariance { .. }
        ));
    }
}
