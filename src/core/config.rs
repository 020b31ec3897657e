//! Configuration for the analytics engine.
//!
//! Every section has defaults, so a partial JSON document is enough to override
//! individual values.

use serde::{Deserialize, Serialize};

use super::error::{AnalyticsError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub metrics: MetricsConfig,
    pub simulation: SimulationConfig,
    pub forecast: ForecastConfig,
}

impl AnalyticsConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalyticsError::invalid_parameter(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.metrics.validate()?;
        self.simulation.validate()?;
        self.forecast.validate()
    }
}

/// Risk metric settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// RSI lookback period.
    pub rsi_period: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { rsi_period: 14 }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            return Err(AnalyticsError::invalid_parameter("RSI period must be > 0"));
        }
        Ok(())
    }
}

/// Monte Carlo portfolio simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of random portfolios to draw.
    pub trials: usize,
    /// Seed of the base generator; identical seeds give identical trials.
    pub seed: u64,
    /// Trials per parallel work unit. Each chunk owns one generator stream.
    pub chunk_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 5000,
            seed: 42,
            chunk_size: 256,
        }
    }
}

impl SimulationConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(AnalyticsError::invalid_parameter("trials must be > 0"));
        }
        if self.chunk_size == 0 {
            return Err(AnalyticsError::invalid_parameter("chunk_size must be > 0"));
        }
        Ok(())
    }
}

/// LSTM forecaster settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Sliding window length (observations per training example).
    pub window: usize,
    /// LSTM hidden units.
    pub hidden_size: usize,
    /// Training epochs.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Element-wise gradient clip; `None` disables clipping.
    pub gradient_clip: Option<f64>,
    /// Seed for weight initialization and shuffling.
    pub seed: u64,
    /// Shuffle examples every epoch.
    pub shuffle: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: 5,
            hidden_size: 50,
            epochs: 50,
            batch_size: 8,
            learning_rate: 0.001,
            gradient_clip: Some(1.0),
            seed: 42,
            shuffle: true,
        }
    }
}

impl ForecastConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(AnalyticsError::invalid_parameter("window must be > 0"));
        }
        if self.hidden_size == 0 {
            return Err(AnalyticsError::invalid_parameter("hidden_size must be > 0"));
        }
        if self.epochs == 0 {
            return Err(AnalyticsError::invalid_parameter("epochs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(AnalyticsError::invalid_parameter("batch_size must be > 0"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(AnalyticsError::invalid_parameter("learning_rate must be > 0"));
        }
        if matches!(self.gradient_clip, Some(c) if !(c > 0.0)) {
            return Err(AnalyticsError::invalid_parameter("gradient_clip must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.metrics.rsi_period, 14);
        assert_eq!(config.simulation.trials, 5000);
        assert_eq!(config.forecast.window, 5);
        assert_eq!(config.forecast.epochs, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            AnalyticsConfig::from_json(r#"{"simulation": {"trials": 100}, "forecast": {"window": 3}}"#)
                .unwrap();
        assert_eq!(config.simulation.trials, 100);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.forecast.window, 3);
        assert_eq!(config.forecast.hidden_size, 50);
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(AnalyticsConfig::from_json(r#"{"metrics": {"rsi_period": 0}}"#).is_err());
        assert!(AnalyticsConfig::from_json("not json").is_err());
    }
}
