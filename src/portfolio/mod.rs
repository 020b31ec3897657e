//! Portfolio simulation engine for equilens.

pub mod covariance;
pub mod engine;
pub mod frontier;
pub mod monte_carlo;
pub mod returns;

pub use covariance::{covariance_matrix, CovarianceMatrix};
pub use engine::{run_efficient_frontier_analysis, FrontierAnalysis};
pub use frontier::{
    efficient_frontier_curve, efficient_portfolio_for_risk_tolerance, min_variance_portfolio,
    FrontierPoint, PowerLawFit,
};
pub use monte_carlo::{simulate, Portfolio, SimulationResult};
pub use returns::{compute_returns, mean_returns, AssetReturns};
