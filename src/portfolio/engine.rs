//! Efficient-frontier analysis pipeline.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::covariance::{covariance_matrix, CovarianceMatrix};
use super::frontier::{
    efficient_frontier_curve, efficient_portfolio_for_risk_tolerance, min_variance_portfolio,
    FrontierPoint,
};
use super::monte_carlo::{simulate, Portfolio};
use super::returns::{compute_returns, mean_returns};
use crate::core::cancel::CancelFlag;
use crate::core::config::SimulationConfig;
use crate::core::types::PriceSeries;
use crate::core::Result;

/// Output of one efficient-frontier request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierAnalysis {
    pub symbols: Vec<String>,
    /// Mean daily return per asset, in percent.
    pub mean_returns: Vec<f64>,
    pub covariance: CovarianceMatrix,
    pub trials: Vec<Portfolio>,
    pub min_variance: Portfolio,
    /// Highest Sharpe ratio trial.
    pub best: Portfolio,
}

impl FrontierAnalysis {
    /// Best-return trial within a risk budget.
    pub fn efficient_portfolio(&self, max_risk: f64) -> Result<&Portfolio> {
        efficient_portfolio_for_risk_tolerance(&self.trials, max_risk)
    }

    /// Monotone upper frontier of the trial cloud.
    pub fn frontier(&self) -> Vec<FrontierPoint> {
        efficient_frontier_curve(&self.trials)
    }
}

/// Trim, compute returns and covariance, then sample random portfolios.
pub fn run_efficient_frontier_analysis(
    assets: &[PriceSeries],
    config: &SimulationConfig,
    cancel: &CancelFlag,
) -> Result<FrontierAnalysis> {
    let returns = compute_returns(assets)?;
    let means = mean_returns(&returns);
    let covariance = covariance_matrix(&returns)?;

    info!(
        assets = returns.num_assets(),
        observations = returns.len(),
        trials = config.trials,
        "running efficient frontier analysis"
    );

    let simulation = simulate(&returns.symbols, &means, &covariance, config, cancel)?;
    let min_variance = min_variance_portfolio(&simulation.trials)?.clone();

    Ok(FrontierAnalysis {
        symbols: returns.symbols,
        mean_returns: means,
        covariance,
        trials: simulation.trials,
        min_variance,
        best: simulation.best,
    })
}
