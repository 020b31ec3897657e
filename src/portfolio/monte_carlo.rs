//! Monte Carlo sampling of random long-only portfolios.
//!
//! Trials are split into fixed-size chunks. Each chunk draws from its own
//! xoshiro256** stream, obtained by jumping the seeded base generator, so the
//! output is identical for a given seed regardless of the rayon thread count.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::covariance::CovarianceMatrix;
use crate::core::cancel::CancelFlag;
use crate::core::config::SimulationConfig;
use crate::core::error::AnalyticsError;
use crate::core::Result;

/// One simulated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Asset weights in symbol order, summing to 1.
    pub weights: Vec<f64>,
    /// Weighted mean daily return, in percent.
    pub expected_return: f64,
    /// Standard deviation of the portfolio's daily return, in percent.
    pub risk: f64,
    /// `expected_return / risk` (risk-free rate 0).
    pub sharpe_ratio: f64,
}

/// All trials plus the best risk-adjusted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Trials in draw order.
    pub trials: Vec<Portfolio>,
    /// Trial with the highest Sharpe ratio (first one on ties).
    pub best: Portfolio,
}

/// Simple xoshiro256** PRNG for deterministic parallel simulation.
#[derive(Clone)]
struct Xoshiro256 {
    s: [u64; 4],
}

impl Xoshiro256 {
    fn new(seed: u64) -> Self {
        // SplitMix64 to seed all 4 state words
        let mut z = seed;
        let mut s = [0u64; 4];
        for item in &mut s {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            let mut x = z;
            x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
            *item = x ^ (x >> 31);
        }
        Self { s }
    }

    /// Advance the state by 2^128 draws.
    fn jump(&mut self) {
        const JUMP: [u64; 4] =
            [0x180ec6d33cfd0aba, 0xd5a61266f0c9392c, 0xa9582618e03fc9aa, 0x39abdc4529b1661c];
        let mut acc = [0u64; 4];
        for j in &JUMP {
            for b in 0..64 {
                if j & (1u64 << b) != 0 {
                    for (a, s) in acc.iter_mut().zip(self.s.iter()) {
                        *a ^= *s;
                    }
                }
                self.next_u64();
            }
        }
        self.s = acc;
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.s[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }

    /// Uniform f64 in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Draw `n` uniform weights and normalize them to sum to 1.
fn random_weights(rng: &mut Xoshiro256, n: usize) -> Vec<f64> {
    loop {
        let weights: Vec<f64> = (0..n).map(|_| rng.next_f64()).collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            return weights.into_iter().map(|w| w / total).collect();
        }
    }
}

/// Score a weight vector against the mean returns and covariance.
fn evaluate(weights: Vec<f64>, mean_returns: &[f64], covariance: &CovarianceMatrix) -> Result<Portfolio> {
    let expected_return: f64 = weights.iter().zip(mean_returns).map(|(w, m)| w * m).sum();
    // Rounding can push a PSD quadratic form slightly below zero
    let variance = covariance.portfolio_variance(&weights).max(0.0);
    let risk = variance.sqrt();
    if risk == 0.0 {
        return Err(AnalyticsError::degenerate("Sharpe ratio (zero portfolio risk)"));
    }

    Ok(Portfolio {
        weights,
        expected_return,
        risk,
        sharpe_ratio: expected_return / risk,
    })
}

/// Sample `config.trials` random portfolios.
///
/// # Arguments
/// * `symbols` - Asset symbols, defining weight order
/// * `mean_returns` - Mean percent return per asset
/// * `covariance` - Covariance of percent returns
/// * `config` - Trial count, seed and chunk size
/// * `cancel` - Checked before every chunk
pub fn simulate(
    symbols: &[String],
    mean_returns: &[f64],
    covariance: &CovarianceMatrix,
    config: &SimulationConfig,
    cancel: &CancelFlag,
) -> Result<SimulationResult> {
    config.validate()?;
    let n_assets = symbols.len();
    if n_assets == 0 {
        return Err(AnalyticsError::invalid_parameter("at least one asset is required"));
    }
    if mean_returns.len() != n_assets {
        return Err(AnalyticsError::length_mismatch(n_assets, mean_returns.len()));
    }
    if covariance.dim() != n_assets {
        return Err(AnalyticsError::length_mismatch(n_assets, covariance.dim()));
    }

    let n_chunks = (config.trials + config.chunk_size - 1) / config.chunk_size;
    let mut base_rng = Xoshiro256::new(config.seed);
    let chunk_rngs: Vec<Xoshiro256> = (0..n_chunks)
        .map(|_| {
            let rng = base_rng.clone();
            base_rng.jump();
            rng
        })
        .collect();

    debug!(trials = config.trials, chunks = n_chunks, assets = n_assets, "starting portfolio simulation");

    let chunks: Vec<Vec<Portfolio>> = chunk_rngs
        .into_par_iter()
        .enumerate()
        .map(|(chunk_idx, mut rng)| {
            if cancel.is_cancelled() {
                return Err(AnalyticsError::cancelled("portfolio simulation"));
            }
            let start = chunk_idx * config.chunk_size;
            let end = (start + config.chunk_size).min(config.trials);
            (start..end)
                .map(|_| evaluate(random_weights(&mut rng, n_assets), mean_returns, covariance))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let trials: Vec<Portfolio> = chunks.into_iter().flatten().collect();

    let mut best = &trials[0];
    for p in &trials[1..] {
        if p.sharpe_ratio > best.sharpe_ratio {
            best = p;
        }
    }
    let best = best.clone();

    debug!(sharpe = best.sharpe_ratio, risk = best.risk, "portfolio simulation finished");
    Ok(SimulationResult { trials, best })
}
