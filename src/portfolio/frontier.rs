//! Selections over a simulated portfolio population.

use serde::{Deserialize, Serialize};

use super::monte_carlo::Portfolio;
use crate::core::error::AnalyticsError;
use crate::core::Result;
use crate::metrics::comovement::regression_line;

/// A (risk, return) point on the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    pub risk: f64,
    pub expected_return: f64,
}

impl From<&Portfolio> for FrontierPoint {
    fn from(p: &Portfolio) -> Self {
        Self {
            risk: p.risk,
            expected_return: p.expected_return,
        }
    }
}

/// Portfolio with the smallest risk. The first one wins ties.
pub fn min_variance_portfolio(portfolios: &[Portfolio]) -> Result<&Portfolio> {
    let (first, rest) = portfolios
        .split_first()
        .ok_or_else(|| AnalyticsError::insufficient_data("minimum variance portfolio", 1, 0))?;
    Ok(rest
        .iter()
        .fold(first, |min, p| if p.risk < min.risk { p } else { min }))
}

/// Highest-return portfolio whose risk does not exceed `max_risk`.
///
/// Reports `NoFeasiblePortfolio` when every trial is riskier than `max_risk`.
pub fn efficient_portfolio_for_risk_tolerance(
    portfolios: &[Portfolio],
    max_risk: f64,
) -> Result<&Portfolio> {
    if max_risk.is_nan() {
        return Err(AnalyticsError::invalid_parameter("max_risk must be a number"));
    }
    let least_risky = min_variance_portfolio(portfolios)?;

    let mut chosen: Option<&Portfolio> = None;
    for p in portfolios.iter().filter(|p| p.risk <= max_risk) {
        match chosen {
            Some(c) if p.expected_return <= c.expected_return => {}
            _ => chosen = Some(p),
        }
    }

    chosen.ok_or(AnalyticsError::NoFeasiblePortfolio {
        max_risk,
        min_risk: least_risky.risk,
    })
}

/// Upper frontier: sorted by risk, keeping points whose return beats every earlier kept point.
pub fn efficient_frontier_curve(portfolios: &[Portfolio]) -> Vec<FrontierPoint> {
    let mut points: Vec<FrontierPoint> = portfolios.iter().map(FrontierPoint::from).collect();
    points.sort_by(|a, b| a.risk.total_cmp(&b.risk));

    let mut best_return = f64::NEG_INFINITY;
    points
        .into_iter()
        .filter(|p| {
            if p.expected_return > best_return {
                best_return = p.expected_return;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Power-law curve `return = coefficient × risk^exponent` fitted to frontier points.
///
/// For display only; nothing else in the crate consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub coefficient: f64,
    pub exponent: f64,
    pub min_risk: f64,
    pub max_risk: f64,
}

impl PowerLawFit {
    /// Least squares in log-log space over points with positive risk and return.
    pub fn fit(frontier: &[FrontierPoint]) -> Result<Self> {
        let (log_risk, log_return): (Vec<f64>, Vec<f64>) = frontier
            .iter()
            .filter(|p| p.risk > 0.0 && p.expected_return > 0.0)
            .map(|p| (p.risk.ln(), p.expected_return.ln()))
            .unzip();
        let line = regression_line(&log_risk, &log_return)?;

        Ok(Self {
            coefficient: line.intercept.exp(),
            exponent: line.slope,
            min_risk: line.endpoints[0].x.exp(),
            max_risk: line.endpoints[1].x.exp(),
        })
    }

    #[inline]
    pub fn predict(&self, risk: f64) -> f64 {
        self.coefficient * risk.powf(self.exponent)
    }

    /// `samples` evenly spaced points between the fitted risk range.
    pub fn smooth_curve(&self, samples: usize) -> Vec<FrontierPoint> {
        match samples {
            0 => Vec::new(),
            1 => vec![FrontierPoint {
                risk: self.min_risk,
                expected_return: self.predict(self.min_risk),
            }],
            _ => {
                let step = (self.max_risk - self.min_risk) / (samples - 1) as f64;
                (0..samples)
                    .map(|i| {
                        let risk = self.min_risk + step * i as f64;
                        FrontierPoint {
                            risk,
                            expected_return: self.predict(risk),
                        }
                    })
                    .collect()
            }
        }
    }
}
