//! Covariance matrix of asset returns.

use serde::{Deserialize, Serialize};

use super::returns::AssetReturns;
use crate::core::error::AnalyticsError;
use crate::core::stats::population_covariance;
use crate::core::Result;

/// Symmetric matrix of population covariances, indexed by symbol order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    symbols: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CovarianceMatrix {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of assets (rows).
    pub fn dim(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Covariance looked up by symbol pair.
    pub fn by_symbol(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Variance of `Σ_i w_i r_i` for the given weights.
    pub fn portfolio_variance(&self, weights: &[f64]) -> f64 {
        debug_assert_eq!(weights.len(), self.dim());
        let mut variance = 0.0;
        for (i, wi) in weights.iter().enumerate() {
            for (j, wj) in weights.iter().enumerate() {
                variance += wi * wj * self.values[i][j];
            }
        }
        variance
    }
}

/// Population covariance (÷ n) between every pair of return series.
pub fn covariance_matrix(returns: &AssetReturns) -> Result<CovarianceMatrix> {
    let n = returns.num_assets();
    if returns.is_empty() {
        return Err(AnalyticsError::insufficient_data("covariance matrix", 1, 0));
    }
    if let Some(bad) = returns.returns.iter().find(|r| r.len() != returns.len()) {
        return Err(AnalyticsError::alignment_mismatch(returns.len(), bad.len()));
    }

    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let cov = population_covariance(&returns.returns[i], &returns.returns[j]);
            values[i][j] = cov;
            values[j][i] = cov;
        }
    }

    Ok(CovarianceMatrix {
        symbols: returns.symbols.clone(),
        values,
    })
}
