//! Core types and utilities for equilens.

pub mod cancel;
pub mod config;
pub mod error;
pub mod stats;
pub mod timeseries;
pub mod types;

pub use cancel::CancelFlag;
pub use config::{AnalyticsConfig, ForecastConfig, MetricsConfig, SimulationConfig};
pub use error::{AnalyticsError, ErrorKind, Result};
pub use timeseries::{align_by_trimming, align_series, daily_returns, ends_together, percent_returns};
pub use types::*;
