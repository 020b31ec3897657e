//! Per-asset return series for the simulation engine.
//!
//! Returns in this component are in percent (fractional × 100), unlike the
//! fractional returns used by the metrics module.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::error::AnalyticsError;
use crate::core::stats::mean;
use crate::core::timeseries::{percent_returns, trim_to_common_length};
use crate::core::types::PriceSeries;
use crate::core::Result;

/// Percentage daily returns of several assets over a common window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturns {
    pub symbols: Vec<String>,
    /// One return series per symbol, all the same length.
    pub returns: Vec<Vec<f64>>,
}

impl AssetReturns {
    pub fn num_assets(&self) -> usize {
        self.symbols.len()
    }

    /// Number of return observations per asset.
    pub fn len(&self) -> usize {
        self.returns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trim assets to their common most recent length and compute percent returns.
pub fn compute_returns(assets: &[PriceSeries]) -> Result<AssetReturns> {
    if assets.is_empty() {
        return Err(AnalyticsError::invalid_parameter("at least one asset is required"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = assets.iter().find(|a| !seen.insert(a.symbol())) {
        return Err(AnalyticsError::invalid_parameter(format!(
            "duplicate symbol {}",
            dup.symbol()
        )));
    }

    let trimmed = trim_to_common_length(assets);
    let returns = trimmed
        .iter()
        .map(|s| percent_returns(&s.closes()))
        .collect::<Result<Vec<_>>>()?;

    Ok(AssetReturns {
        symbols: trimmed.iter().map(|s| s.symbol().to_string()).collect(),
        returns,
    })
}

/// Mean percent return of each asset, in symbol order.
pub fn mean_returns(returns: &AssetReturns) -> Vec<f64> {
    returns.returns.iter().map(|r| mean(r)).collect()
}
